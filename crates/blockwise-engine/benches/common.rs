// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
use blockwise_engine::{Editor, EditorConfig, OutputBlockData, OutputData};
use serde_json::json;

#[allow(dead_code)]
pub fn generate_document(blocks: usize) -> OutputData {
    let blocks = (0..blocks)
        .map(|i| match i % 4 {
            0 => OutputBlockData::new("header", json!({ "text": format!("Section {i}"), "level": 2 })),
            3 => OutputBlockData::new("code", json!({ "code": "fn example() {\n    42\n}" })),
            _ => OutputBlockData::new(
                "paragraph",
                json!({ "text": format!("Paragraph {i} with <b>some</b> content.") }),
            ),
        })
        .collect();
    OutputData::new(blocks)
}

#[allow(dead_code)]
pub fn editor_with(blocks: usize) -> Editor {
    Editor::new(EditorConfig {
        data: Some(generate_document(blocks)),
        ..EditorConfig::default()
    })
    .unwrap()
}
