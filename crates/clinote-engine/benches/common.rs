// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
#[allow(dead_code)]
pub fn generate_note(sections: usize) -> String {
    let base = concat!(
        "# Session\n\n## Subjective\n\n",
        "Client reports improved sleep and steadier mood.\n\n",
        "> Things feel a bit lighter.\n\n",
        "- sleep 7h\n- appetite normal\n- exercise twice\n\n",
        "1. review thought record\n2. plan activities\n\n",
        "- [x] consent on file\n- [ ] send summary\n\n",
    );
    base.repeat(sections)
}
