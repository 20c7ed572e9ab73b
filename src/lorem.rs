//! Lorem-ipsum paragraph generation.
//!
//! A `lorem`/`ipsum` tag produces `n` words drawn from the static word
//! list starting at a random offset, broken into sentences of random
//! length with capitalised first words and `.`/`?`/`!` terminators. All
//! randomness comes from the caller's seeded generator, so a fixed
//! [`crate::Options::lorem_seed`] reproduces the paragraph exactly.

use rand::rngs::StdRng;
use rand::Rng;

const MIN_SENTENCE: usize = 5;
const MAX_SENTENCE: usize = 30;

#[rustfmt::skip]
const WORDS: &[&str] = &[
    "lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipisicing",
    "elit", "sed", "do", "eiusmod", "tempor", "incididunt", "ut", "labore",
    "et", "dolore", "magna", "aliqua", "enim", "ad", "minim", "veniam",
    "quis", "nostrud", "exercitation", "ullamco", "laboris", "nisi",
    "aliquip", "ex", "ea", "commodo", "consequat", "duis", "aute", "irure",
    "in", "reprehenderit", "voluptate", "velit", "esse", "cillum", "fugiat",
    "nulla", "pariatur", "excepteur", "sint", "occaecat", "cupidatat", "non",
    "proident", "sunt", "culpa", "qui", "officia", "deserunt", "mollit",
    "anim", "id", "est", "laborum", "at", "vero", "eos", "accusamus",
    "iusto", "odio", "dignissimos", "ducimus", "blanditiis",
    "praesentium", "voluptatum", "deleniti", "atque", "corrupti", "quos",
    "dolores", "quas", "molestias", "excepturi", "occaecati", "cupiditate",
    "provident", "similique", "mollitia", "animi", "dolorum", "fuga",
    "harum", "quidem", "rerum", "facilis", "expedita", "distinctio", "nam",
    "libero", "tempore", "cum", "soluta", "nobis", "eligendi", "optio",
    "cumque", "nihil", "impedit", "quo", "minus", "quod", "maxime",
    "placeat", "facere", "possimus", "omnis", "voluptas", "assumenda",
    "repellendus", "temporibus", "autem", "quibusdam", "officiis",
    "debitis", "aut", "necessitatibus", "saepe", "eveniet", "voluptates",
    "repudiandae", "recusandae", "itaque", "earum", "hic", "tenetur",
    "sapiente", "delectus", "reiciendis", "voluptatibus", "maiores",
    "alias", "perferendis", "doloribus", "asperiores", "repellat",
];

/// Generate a paragraph of `word_count` words.
pub(crate) fn paragraph(rng: &mut StdRng, word_count: usize) -> String {
    if word_count == 0 {
        return String::new();
    }
    let start = rng.gen_range(0..WORDS.len());
    let words: Vec<&str> = (0..word_count)
        .map(|i| WORDS[(start + i) % WORDS.len()])
        .collect();

    let mut sentences = Vec::new();
    let mut index = 0;
    while index < word_count {
        let remaining = word_count - index;
        let length = if remaining <= MIN_SENTENCE {
            remaining
        } else {
            let drawn = rng.gen_range(MIN_SENTENCE..=MAX_SENTENCE.min(remaining));
            // a leftover shorter than a sentence joins this one
            if remaining - drawn < MIN_SENTENCE {
                remaining
            } else {
                drawn
            }
        };
        sentences.push(sentence(rng, &words[index..index + length]));
        index += length;
    }
    sentences.join(" ")
}

fn sentence(rng: &mut StdRng, words: &[&str]) -> String {
    let mut text = words.join(" ");
    if text.ends_with(',') {
        text.pop();
    }
    let mut chars = text.chars();
    let capitalised = match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => text,
    };
    let terminator = match rng.gen_range(0..4) {
        r if r > 1 => '.',
        r if r > 0 => '?',
        _ => '!',
    };
    format!("{}{}", capitalised, terminator)
}
