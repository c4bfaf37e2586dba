//! Text clean-up applied to form input before it is stored or compared, and the display formatting used in mail.

/// Trims surrounding whitespace.
pub fn normalise_text(s: &str) -> String {
    s.trim().to_string()
}

/// Trims and lower-cases an email address.
pub fn normalise_email(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Capitalises the first letter of every space-separated word, leaving the rest of each word untouched.
pub fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
