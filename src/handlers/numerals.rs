use once_cell::sync::Lazy;
use regex::Regex;

const ONES: [&str; 20] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen",
    "nineteen",
];

const TENS: [&str; 10] = [
    "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];

const SCALES: [(u64, &str); 6] = [
    (1_000_000_000_000_000_000, "quintillion"),
    (1_000_000_000_000_000, "quadrillion"),
    (1_000_000_000_000, "trillion"),
    (1_000_000_000, "billion"),
    (1_000_000, "million"),
    (1_000, "thousand"),
];

static ROMAN_NUMERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^m{0,4}(cm|cd|d?c{0,3})(xc|xl|l?x{0,3})(ix|iv|v?i{0,3})$")
        .expect("Failed to compile roman numeral regex")
});

fn below_hundred(number: u64) -> String {
    if number < 20 {
        return ONES[number as usize].to_string();
    }

    let tens = TENS[(number / 10) as usize];
    match number % 10 {
        0 => tens.to_string(),
        ones => format!("{} {}", tens, ONES[ones as usize]),
    }
}

fn below_thousand(number: u64) -> String {
    if number < 100 {
        return below_hundred(number);
    }

    let hundreds = format!("{} hundred", ONES[(number / 100) as usize]);
    match number % 100 {
        0 => hundreds,
        rest => format!("{} and {}", hundreds, below_hundred(rest)),
    }
}

/// British style cardinal words, e.g. 1234 → "one thousand two hundred and thirty four".
pub fn cardinal_words(number: u64) -> String {
    if number == 0 {
        return ONES[0].to_string();
    }

    let mut parts: Vec<String> = Vec::new();
    let mut remainder = number;

    for (scale, name) in SCALES.iter() {
        if remainder >= *scale {
            parts.push(format!("{} {}", below_thousand(remainder / scale), name));
            remainder %= scale;
        }
    }

    if remainder > 0 {
        if !parts.is_empty() && remainder < 100 {
            parts.push(format!("and {}", below_hundred(remainder)));
        } else {
            parts.push(below_thousand(remainder));
        }
    }

    parts.join(" ")
}

pub fn ordinal_words(number: u64) -> String {
    let cardinal = cardinal_words(number);
    let (head, last) = match cardinal.rsplit_once(' ') {
        Some((head, last)) => (Some(head), last),
        None => (None, cardinal.as_str()),
    };

    let ordinal_last = match last {
        "one" => "first".to_string(),
        "two" => "second".to_string(),
        "three" => "third".to_string(),
        "five" => "fifth".to_string(),
        "eight" => "eighth".to_string(),
        "nine" => "ninth".to_string(),
        "twelve" => "twelfth".to_string(),
        word if word.ends_with('y') => format!("{}ieth", &word[..word.len() - 1]),
        word => format!("{}th", word),
    };

    match head {
        Some(head) => format!("{} {}", head, ordinal_last),
        None => ordinal_last,
    }
}

/// How a year is read aloud: 1234 → "twelve thirty four", 1905 → "nineteen oh five".
pub fn year_words(number: u64) -> String {
    let high = number / 100;
    let low = number % 100;

    if high == 0 || (high % 10 == 0 && low < 10) || high >= 100 {
        return cardinal_words(number);
    }

    let low_text = match low {
        0 => "hundred".to_string(),
        1..=9 => format!("oh {}", cardinal_words(low)),
        _ => cardinal_words(low),
    };

    format!("{} {}", cardinal_words(high), low_text)
}

pub fn digit_words(digits: &str) -> String {
    digits
        .chars()
        .filter_map(|digit| digit.to_digit(10))
        .map(|digit| ONES[digit as usize])
        .collect::<Vec<&str>>()
        .join(" ")
}

pub fn is_roman_numeral(text: &str) -> bool {
    !text.is_empty() && ROMAN_NUMERAL.is_match(&text.to_lowercase())
}

pub fn roman_to_int(text: &str) -> Option<u64> {
    if !is_roman_numeral(text) {
        return None;
    }

    let values: Vec<u64> = text
        .to_uppercase()
        .chars()
        .map(|numeral| match numeral {
            'I' => 1,
            'V' => 5,
            'X' => 10,
            'L' => 50,
            'C' => 100,
            'D' => 500,
            'M' => 1000,
            _ => 0,
        })
        .collect();

    let mut total = 0;
    for (index, value) in values.iter().enumerate() {
        match values.get(index + 1) {
            Some(next) if next > value => total -= *value as i64,
            _ => total += *value as i64,
        }
    }

    u64::try_from(total).ok()
}
