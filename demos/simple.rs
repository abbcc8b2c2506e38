use aml_core::config::RenderConfig;
use aml_core::generator::{Annotation, Annotations};
use aml_core::process;

fn main() {
    let aml_data = r#"<red>Learning 中文 is a long game.

(<green>Spaced repetition schedules each card by how hard it was) and
the rest is [[Habit|habit]].
--MORE--
<<<
(<blue>The journey of a thousand miles begins with one step.)
>>>
"#;

    let mut annotations = Annotations::new();
    annotations.insert(
        "中文".to_string(),
        Annotation {
            pinyin: "zhōng wén".to_string(),
            definition: "Chinese language".to_string(),
        },
    );

    match process(aml_data, "example.aml") {
        Ok(result) => {
            println!("Preview:\n{}\n", result.preview_html());
            let html = result.to_html_with(&RenderConfig::default(), Some(&annotations));
            println!("Full HTML:\n{html}\n");
            for quote in result.quotes() {
                println!("Quote ({}): {}", quote.quote_type.as_str(), quote.text);
            }
        }
        Err(e) => {
            eprintln!("Failed to process AML: {e:?}");
        }
    }
}
