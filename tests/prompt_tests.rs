use jcritic::{
    build_prompt,
    constants::{CODE_HEADER, STATEMENT_HEADER, STRUCTURE_REMINDER},
    format_correction_prompt,
    prompt::{concat_sources, system_instruction},
};

const STATEMENT: &str = "Implement a class 'BankAccount' with a private 'balance'.";
const CODE: &str = "public class BankAccount {\n    private double balance;\n}";

#[test]
fn single_file_scenario_has_fence_and_headers() {
    let prompt = format_correction_prompt("X", "public class A {}");

    assert!(prompt.contains(STATEMENT_HEADER));
    assert!(prompt.contains(CODE_HEADER));
    assert!(prompt.contains("```java\npublic class A {}\n```"));
    assert_eq!(
        prompt,
        "--- ASSIGNMENT STATEMENT ---\nX\n--- STUDENT CODE ---\n```java\npublic class A {}\n```\n\n\
         Follow the rigid structure defined in the system instruction."
    );
}

#[test]
fn markers_appear_in_order() {
    let prompt = build_prompt("SYSTEM", STATEMENT, CODE);

    let positions = [
        prompt.find("SYSTEM").unwrap(),
        prompt.find(STATEMENT_HEADER).unwrap(),
        prompt.find(STATEMENT).unwrap(),
        prompt.find(CODE_HEADER).unwrap(),
        prompt.find("```java").unwrap(),
        prompt.find(CODE).unwrap(),
        prompt.find(STRUCTURE_REMINDER).unwrap(),
    ];
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "{positions:?}");
    assert!(prompt.ends_with(STRUCTURE_REMINDER));
}

#[test]
fn prompts_are_deterministic() {
    let instruction = system_instruction("English");
    assert_eq!(
        build_prompt(&instruction, STATEMENT, CODE),
        build_prompt(&instruction, STATEMENT, CODE)
    );
    assert_eq!(
        format_correction_prompt(STATEMENT, CODE),
        format_correction_prompt(STATEMENT, CODE)
    );
}

#[test]
fn inputs_are_copied_verbatim() {
    let statement = "Use `backticks`, {braces}, <tags> & \"quotes\"\n\n  keep   spacing  ";
    let code = "  class A { String s = \"```\"; }\t\n";
    let prompt = format_correction_prompt(statement, code);

    assert!(prompt.contains(statement));
    assert!(prompt.contains(code));
}

#[test]
fn multi_file_concatenation_keeps_order_and_pairs() {
    let files = [
        ("Main.java", "class Main {}\n"),
        ("BankAccount.java", "\n\nclass BankAccount {}\n\n"),
        ("Util.java", "class Util {}"),
    ];
    let combined = concat_sources(files);

    assert_eq!(
        combined,
        "// --- FILE BEGIN: Main.java ---\nclass Main {}\n// --- FILE END: Main.java ---\n\n\
         // --- FILE BEGIN: BankAccount.java ---\nclass BankAccount {}\n// --- FILE END: \
         BankAccount.java ---\n\n\
         // --- FILE BEGIN: Util.java ---\nclass Util {}\n// --- FILE END: Util.java ---\n\n"
    );

    for (name, _) in files {
        assert_eq!(combined.matches(&format!("FILE BEGIN: {name} ---")).count(), 1);
        assert_eq!(combined.matches(&format!("FILE END: {name} ---")).count(), 1);
    }
    let main = combined.find("BEGIN: Main.java").unwrap();
    let account = combined.find("BEGIN: BankAccount.java").unwrap();
    let util = combined.find("BEGIN: Util.java").unwrap();
    assert!(main < account && account < util);

    assert_eq!(combined, concat_sources(files));
}
