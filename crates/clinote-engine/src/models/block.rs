use serde::{Deserialize, Serialize};

use super::ids::{BlockId, IdProvider, ItemId};

/// The closed set of block types a note can contain.
///
/// Three of them are list types whose blocks own a sequence of [`ListItem`]s;
/// the rest are scalar types whose blocks own a single text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BlockType {
    Heading1,
    Heading2,
    Paragraph,
    BulletList,
    NumberList,
    CheckList,
    Quote,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown block type: {0}")]
pub struct UnknownBlockType(pub String);

impl BlockType {
    /// Every block type, in the order a block palette shows them
    pub const ALL: [BlockType; 7] = [
        BlockType::Paragraph,
        BlockType::Heading1,
        BlockType::Heading2,
        BlockType::BulletList,
        BlockType::NumberList,
        BlockType::CheckList,
        BlockType::Quote,
    ];

    pub fn is_list(self) -> bool {
        matches!(
            self,
            BlockType::BulletList | BlockType::NumberList | BlockType::CheckList
        )
    }

    /// Identifier used for insertion tokens and serde
    pub fn token(self) -> &'static str {
        match self {
            BlockType::Heading1 => "heading1",
            BlockType::Heading2 => "heading2",
            BlockType::Paragraph => "paragraph",
            BlockType::BulletList => "bulletList",
            BlockType::NumberList => "numberList",
            BlockType::CheckList => "checkList",
            BlockType::Quote => "quote",
        }
    }

    /// Human readable name for menus and palettes
    pub fn label(self) -> &'static str {
        match self {
            BlockType::Heading1 => "Heading 1",
            BlockType::Heading2 => "Heading 2",
            BlockType::Paragraph => "Text",
            BlockType::BulletList => "Bulleted list",
            BlockType::NumberList => "Numbered list",
            BlockType::CheckList => "Checklist",
            BlockType::Quote => "Quote",
        }
    }

    /// Lenient token lookup: anything outside the closed set becomes a paragraph
    pub fn from_token(token: &str) -> Self {
        token.parse().unwrap_or(BlockType::Paragraph)
    }

    /// The type after this one in palette order, wrapping around
    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|t| *t == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

impl std::str::FromStr for BlockType {
    type Err = UnknownBlockType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlockType::ALL
            .into_iter()
            .find(|t| t.token() == s)
            .ok_or_else(|| UnknownBlockType(s.to_string()))
    }
}

impl std::fmt::Display for BlockType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

/// One entry of a list block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    pub id: ItemId,
    pub content: String,
    /// Only meaningful inside a check list; `None` everywhere else
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
}

impl ListItem {
    pub fn new(id: ItemId, content: impl Into<String>, checked: Option<bool>) -> Self {
        Self {
            id,
            content: content.into(),
            checked,
        }
    }

    /// An empty item shaped for a list of the given type
    pub fn empty(id: ItemId, block_type: BlockType) -> Self {
        Self::new(id, String::new(), checked_default(block_type))
    }

    pub fn is_checked(&self) -> bool {
        self.checked.unwrap_or(false)
    }
}

/// The `checked` value a fresh item gets in a list of `block_type`
pub(crate) fn checked_default(block_type: BlockType) -> Option<bool> {
    (block_type == BlockType::CheckList).then_some(false)
}

/// What a block holds, dispatched on the list/scalar classification of its type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BlockContent {
    Text(String),
    Items(Vec<ListItem>),
}

/// A typed unit of a note.
///
/// ## Invariants
///
/// - `content` is [`BlockContent::Text`] exactly when `block_type` is scalar
/// - a list block always holds at least one item
///
/// The engine is the only code that mutates blocks and upholds both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    #[serde(rename = "type")]
    pub block_type: BlockType,
    pub content: BlockContent,
}

impl Block {
    pub fn text(id: BlockId, block_type: BlockType, content: impl Into<String>) -> Self {
        debug_assert!(!block_type.is_list());
        Self {
            id,
            block_type,
            content: BlockContent::Text(content.into()),
        }
    }

    pub fn list(id: BlockId, block_type: BlockType, items: Vec<ListItem>) -> Self {
        debug_assert!(block_type.is_list() && !items.is_empty());
        Self {
            id,
            block_type,
            content: BlockContent::Items(items),
        }
    }

    pub fn empty_paragraph(id: BlockId) -> Self {
        Self::text(id, BlockType::Paragraph, "")
    }

    /// A fresh empty block of any type; list blocks get one empty item
    pub fn empty(id: BlockId, block_type: BlockType, ids: &mut dyn IdProvider) -> Self {
        if block_type.is_list() {
            Self::list(
                id,
                block_type,
                vec![ListItem::empty(ids.next_item_id(), block_type)],
            )
        } else {
            Self::text(id, block_type, "")
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self.content, BlockContent::Items(_))
    }

    /// Text of a scalar block
    pub fn text_content(&self) -> Option<&str> {
        match &self.content {
            BlockContent::Text(text) => Some(text),
            BlockContent::Items(_) => None,
        }
    }

    pub fn items(&self) -> Option<&[ListItem]> {
        match &self.content {
            BlockContent::Items(items) => Some(items),
            BlockContent::Text(_) => None,
        }
    }

    pub(crate) fn items_mut(&mut self) -> Option<&mut Vec<ListItem>> {
        match &mut self.content {
            BlockContent::Items(items) => Some(items),
            BlockContent::Text(_) => None,
        }
    }

    pub fn item(&self, item_id: ItemId) -> Option<&ListItem> {
        self.items()?.iter().find(|item| item.id == item_id)
    }

    pub fn item_index(&self, item_id: ItemId) -> Option<usize> {
        self.items()?.iter().position(|item| item.id == item_id)
    }

    pub fn first_item(&self) -> Option<&ListItem> {
        self.items()?.first()
    }

    pub fn last_item(&self) -> Option<&ListItem> {
        self.items()?.last()
    }
}

/// Reference to something that can hold input focus: a whole block, or one
/// item inside a list block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeRef {
    Block(BlockId),
    Item(BlockId, ItemId),
}

impl NodeRef {
    pub fn block_id(self) -> BlockId {
        match self {
            NodeRef::Block(id) | NodeRef::Item(id, _) => id,
        }
    }

    pub fn item_id(self) -> Option<ItemId> {
        match self {
            NodeRef::Block(_) => None,
            NodeRef::Item(_, item) => Some(item),
        }
    }

    /// Where focus lands when entering `block`: the block itself, or its
    /// first or last item when it is a list
    pub fn entering(block: &Block, from_above: bool) -> Self {
        let item = if from_above {
            block.first_item()
        } else {
            block.last_item()
        };
        match item {
            Some(item) => NodeRef::Item(block.id, item.id),
            None => NodeRef::Block(block.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SequentialIds;
    use rstest::rstest;

    #[rstest]
    #[case("heading1", BlockType::Heading1)]
    #[case("heading2", BlockType::Heading2)]
    #[case("paragraph", BlockType::Paragraph)]
    #[case("bulletList", BlockType::BulletList)]
    #[case("numberList", BlockType::NumberList)]
    #[case("checkList", BlockType::CheckList)]
    #[case("quote", BlockType::Quote)]
    fn test_tokens_parse_to_their_type(#[case] token: &str, #[case] expected: BlockType) {
        assert_eq!(token.parse::<BlockType>(), Ok(expected));
        assert_eq!(expected.token(), token);
    }

    #[test]
    fn test_unknown_token_is_an_error_but_falls_back_leniently() {
        assert_eq!(
            "table".parse::<BlockType>(),
            Err(UnknownBlockType("table".to_string()))
        );
        assert_eq!(BlockType::from_token("table"), BlockType::Paragraph);
        assert_eq!(BlockType::from_token("Heading1"), BlockType::Paragraph);
    }

    #[test]
    fn test_serde_names_are_the_tokens() {
        for block_type in BlockType::ALL {
            let json = serde_json::to_string(&block_type).unwrap();
            assert_eq!(json, format!("\"{}\"", block_type.token()));
            assert_eq!(serde_json::from_str::<BlockType>(&json).unwrap(), block_type);
        }
    }

    #[test]
    fn test_block_serde_shape() {
        let block = Block::list(
            BlockId(1),
            BlockType::CheckList,
            vec![
                ListItem::new(ItemId(2), "consent form", Some(true)),
                ListItem::new(ItemId(3), "release", Some(false)),
            ],
        );

        let json = serde_json::to_value(&block).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "id": 1,
                "type": "checkList",
                "content": {"items": [
                    {"id": 2, "content": "consent form", "checked": true},
                    {"id": 3, "content": "release", "checked": false}
                ]}
            })
        );
        assert_eq!(serde_json::from_value::<Block>(json).unwrap(), block);
    }

    #[test]
    fn test_unchecked_flag_is_omitted_outside_check_lists() {
        let block = Block::text(BlockId(7), BlockType::Quote, "hi");
        let item = ListItem::new(ItemId(8), "x", None);

        assert_eq!(
            serde_json::to_string(&block).unwrap(),
            r#"{"id":7,"type":"quote","content":{"text":"hi"}}"#
        );
        assert_eq!(serde_json::to_string(&item).unwrap(), r#"{"id":8,"content":"x"}"#);
        let parsed: ListItem = serde_json::from_str(r#"{"id":8,"content":"x"}"#).unwrap();
        assert_eq!(parsed, item);
    }

    #[test]
    fn test_list_classification() {
        let lists: Vec<_> = BlockType::ALL.into_iter().filter(|t| t.is_list()).collect();
        assert_eq!(
            lists,
            vec![
                BlockType::BulletList,
                BlockType::NumberList,
                BlockType::CheckList
            ]
        );
    }

    #[test]
    fn test_next_cycles_through_every_type() {
        let mut t = BlockType::Paragraph;
        let mut seen = vec![t];
        for _ in 0..6 {
            t = t.next();
            seen.push(t);
        }
        assert_eq!(seen, BlockType::ALL.to_vec());
        assert_eq!(t.next(), BlockType::Paragraph);
    }

    #[test]
    fn test_empty_list_block_gets_one_item() {
        let mut ids = SequentialIds::new();
        let id = ids.next_block_id();
        let block = Block::empty(id, BlockType::CheckList, &mut ids);

        let items = block.items().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].content, "");
        assert_eq!(items[0].checked, Some(false));
    }

    #[test]
    fn test_empty_scalar_block_has_no_items() {
        let mut ids = SequentialIds::new();
        let block = Block::empty(BlockId(9), BlockType::Quote, &mut ids);
        assert_eq!(block.text_content(), Some(""));
        assert!(block.items().is_none());
    }

    #[test]
    fn test_entering_a_list_lands_on_first_or_last_item() {
        let block = Block::list(
            BlockId(1),
            BlockType::BulletList,
            vec![
                ListItem::new(ItemId(2), "a", None),
                ListItem::new(ItemId(3), "b", None),
            ],
        );
        assert_eq!(
            NodeRef::entering(&block, true),
            NodeRef::Item(BlockId(1), ItemId(2))
        );
        assert_eq!(
            NodeRef::entering(&block, false),
            NodeRef::Item(BlockId(1), ItemId(3))
        );

        let para = Block::empty_paragraph(BlockId(4));
        assert_eq!(NodeRef::entering(&para, true), NodeRef::Block(BlockId(4)));
    }
}
