use anyhow::Result;
use std::io::{self, Write};

/// Interactive model menu: list what is installed, read one line, resolve it.
pub(crate) fn prompt_model_choice(installed: &[String]) -> Result<Option<String>> {
    println!("\nInstalled Models:");
    for (idx, name) in installed.iter().enumerate() {
        println!("  {}. {name}", idx + 1);
    }
    println!("{}", "-".repeat(30));
    print!("Select Model (1-{}): ", installed.len());
    io::stdout().flush()?;

    let mut choice = String::new();
    io::stdin().read_line(&mut choice)?;
    Ok(resolve_choice(choice.trim(), installed))
}

/// Accepts either a 1-based menu index or an exact model name.
pub(crate) fn resolve_choice(choice: &str, installed: &[String]) -> Option<String> {
    if choice.chars().all(|c| c.is_ascii_digit()) && !choice.is_empty() {
        let number: usize = choice.parse().ok()?;
        if (1..=installed.len()).contains(&number) {
            return Some(installed[number - 1].clone());
        }
        return None;
    }
    installed.iter().find(|name| name.as_str() == choice).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn installed() -> Vec<String> {
        vec!["en-us-small".to_string(), "hi-small".to_string()]
    }

    #[test]
    fn numeric_choice_is_one_based() {
        assert_eq!(resolve_choice("1", &installed()).as_deref(), Some("en-us-small"));
        assert_eq!(resolve_choice("2", &installed()).as_deref(), Some("hi-small"));
    }

    #[test]
    fn out_of_range_number_is_rejected() {
        assert_eq!(resolve_choice("0", &installed()), None);
        assert_eq!(resolve_choice("3", &installed()), None);
    }

    #[test]
    fn exact_name_is_accepted() {
        assert_eq!(resolve_choice("hi-small", &installed()).as_deref(), Some("hi-small"));
    }

    #[test]
    fn unknown_input_is_rejected() {
        assert_eq!(resolve_choice("nope", &installed()), None);
        assert_eq!(resolve_choice("", &installed()), None);
    }
}
