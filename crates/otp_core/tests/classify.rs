use otp_core::{classify, is_otp_text, OtpCandidate, TRIGGER_WORDS};
use pretty_assertions::assert_eq;

fn init_logging() {
    otp_logging::initialize_for_tests();
}

#[test]
fn eleven_digit_run_is_rejected() {
    init_logging();
    assert_eq!(classify("your code is 12345678901", 0), None);
}

#[test]
fn four_digit_run_with_trigger_is_accepted() {
    init_logging();
    let candidate = classify("your code is 1234", 7).expect("candidate");
    assert_eq!(
        candidate,
        OtpCandidate {
            code: "1234".to_string(),
            source_text: "your code is 1234".to_string(),
            timestamp: 7,
        }
    );
}

#[test]
fn digit_run_without_trigger_word_is_rejected() {
    init_logging();
    assert_eq!(classify("order 482910 shipped", 0), None);
    assert!(!is_otp_text("order 482910 shipped"));
}

#[test]
fn otp_trigger_is_enough() {
    init_logging();
    let candidate = classify("otp 482910", 0).expect("candidate");
    assert_eq!(candidate.code, "482910");
}

#[test]
fn leftmost_code_wins() {
    init_logging();
    let candidate = classify("code 1111 or 2222", 0).expect("candidate");
    assert_eq!(candidate.code, "1111");
}

#[test]
fn original_casing_is_kept() {
    init_logging();
    let text = "Your ACCESS Code: 837261";
    let candidate = classify(text, 0).expect("candidate");
    assert_eq!(candidate.source_text, text);
    assert!(candidate.source_text.contains(&candidate.code));
}

#[test]
fn trigger_substring_inside_other_word_still_counts() {
    init_logging();
    let candidate = classify("New codecs pack 2024 released", 0).expect("candidate");
    assert_eq!(candidate.code, "2024");
}

#[test]
fn short_pin_is_never_a_code() {
    init_logging();
    assert_eq!(classify("Your access pin is 123", 0), None);
}

#[test]
fn each_trigger_word_is_sufficient_alone() {
    init_logging();
    for word in TRIGGER_WORDS {
        let text = format!("{} 482910", word.to_uppercase());
        let candidate = classify(&text, 0).expect("candidate");
        assert_eq!(candidate.code, "482910");
    }
}

#[test]
fn letters_next_to_digits_do_not_break_a_run() {
    init_logging();
    assert_eq!(classify("Ref ABC123456 code", 0).expect("candidate").code, "123456");
    assert_eq!(classify("code 123456abc", 0).expect("candidate").code, "123456");
}
