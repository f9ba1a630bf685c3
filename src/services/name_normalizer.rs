/// Leading tokens that carry no brand identity ("The Roku Channel", "Amazon Prime Video")
const PREFIX_STOPWORDS: [&str; 2] = ["the", "amazon"];

/// Tokenizes a provider display name into lowercase, order-preserving tokens.
///
/// `&` becomes `and`, `+` becomes `plus`, any run of non-alphanumeric characters
/// is a single separator, and leading stopwords are stripped repeatedly.
pub fn tokenize(name: &str) -> Vec<String> {
    let lowered = name
        .to_lowercase()
        .replace('&', " and ")
        .replace('+', " plus ");

    let spaced: String = lowered
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    let mut tokens: Vec<String> = spaced.split_whitespace().map(str::to_string).collect();

    let leading = tokens
        .iter()
        .take_while(|token| PREFIX_STOPWORDS.contains(&token.as_str()))
        .count();
    tokens.drain(..leading);

    tokens
}
