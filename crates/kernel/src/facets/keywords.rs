//! Keyword tokenizing for the search box.

/// Quote characters that group several words into one token.
const QUOTATION_MARKS: [char; 2] = ['"', '\''];

/// Split a string into space-delimited tokens, keeping quoted runs together.
///
/// A token starting with `"` or `'` runs to the next occurrence of the same
/// mark; the marks themselves are dropped. An opening mark with no partner
/// absorbs the rest of the input.
pub fn tokenize_quoted(input: &str) -> Vec<String> {
    tokenize_with(input, &QUOTATION_MARKS)
}

/// [`tokenize_quoted`] with a custom set of quotation marks.
pub fn tokenize_with(input: &str, quotation_marks: &[char]) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut rest = input;

    loop {
        rest = rest.trim_start_matches(' ');
        let Some(first) = rest.chars().next() else {
            break;
        };

        let word_end = rest.find(' ').unwrap_or(rest.len());
        let word = &rest[..word_end];

        if !quotation_marks.contains(&first) {
            tokens.push(word.to_string());
            rest = &rest[word_end..];
            continue;
        }

        let inner = &word[first.len_utf8()..];
        if let Some(last) = inner.chars().last()
            && quotation_marks.contains(&last)
        {
            // Self-contained quoted word: 'qux' or "qux"
            push_nonempty(&mut tokens, &inner[..inner.len() - last.len_utf8()]);
            rest = &rest[word_end..];
            continue;
        }

        let after_mark = &rest[first.len_utf8()..];
        match after_mark.find(first) {
            Some(close) => {
                push_nonempty(&mut tokens, &after_mark[..close]);
                rest = &after_mark[close + first.len_utf8()..];
            }
            None => {
                push_nonempty(&mut tokens, after_mark);
                rest = "";
            }
        }
    }

    tokens
}

fn push_nonempty(tokens: &mut Vec<String>, token: &str) {
    let token = token.trim();
    if !token.is_empty() {
        tokens.push(token.to_string());
    }
}

/// Rewrite user keywords into `websearch_to_tsquery` syntax.
///
/// Multi-word tokens become double-quoted phrases; single words pass
/// through untouched so `-word` and `or` keep their operator meaning.
pub fn to_websearch_query(input: &str) -> String {
    tokenize_quoted(input)
        .into_iter()
        .map(|token| {
            if token.contains(' ') {
                format!("\"{}\"", token.replace('"', ""))
            } else {
                token.replace('"', "")
            }
        })
        .filter(|token| !token.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
