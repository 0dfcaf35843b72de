use crate::types::Language;

const JAVA_TEMPLATE: &str = r#"import java.util.Scanner;

/**
 * IMPORTANT:
 * 1. Your main class MUST be named 'Solution' (not Main, not FizzBuzz, etc.)
 * 2. Do NOT change the class name or it will result in compilation error
 * 3. You can create additional methods and classes if needed
 * 4. Input is read from System.in (use Scanner as shown below)
 * 5. Output should be printed to System.out (use System.out.println())
 */
public class Solution {

    public static void main(String[] args) {
        Scanner scanner = new Scanner(System.in);

        // Read input here
        // Example: int n = scanner.nextInt();

        // Call your solution method
        // Example: solve(n);

        scanner.close();
    }

    // Add your solution method(s) here
    // Example:
    // public static void solve(int n) {
    //     // Your logic here
    // }
}"#;

const PYTHON3_TEMPLATE: &str = r#"# Read input using input()
# Example: n = int(input())

# Write your solution here
# Example:
# def solve(n):
#     # Your logic here
#     pass

# Call your solution
# solve(n)
"#;

const CPP_TEMPLATE: &str = r#"#include <iostream>
using namespace std;

int main() {
    // Read input
    // Example: int n; cin >> n;

    // Write your solution here

    return 0;
}"#;

const C_TEMPLATE: &str = r#"#include <stdio.h>

int main() {
    // Read input
    // Example: int n; scanf("%d", &n);

    // Write your solution here

    return 0;
}"#;

const JAVASCRIPT_TEMPLATE: &str = r#"// For Node.js environment
// Read input using readline or process.stdin

const readline = require('readline');
const rl = readline.createInterface({
    input: process.stdin,
    output: process.stdout
});

rl.on('line', (line) => {
    // Process input line
    // Example: const n = parseInt(line);

    // Write your solution here

    rl.close();
});"#;

/// Default code skeleton for a language. Pure and total; an unrecognized
/// language gets an empty buffer.
pub fn template(language: Language) -> &'static str {
    match language {
        Language::Java => JAVA_TEMPLATE,
        Language::Python3 => PYTHON3_TEMPLATE,
        Language::Cpp => CPP_TEMPLATE,
        Language::C => C_TEMPLATE,
        Language::Javascript => JAVASCRIPT_TEMPLATE,
        Language::Unknown => "",
    }
}

/// The one editable code buffer of the problem view. Switching languages
/// always resets the buffer to the new language's template, discarding any
/// edits; re-selecting the current language leaves the buffer alone.
#[derive(Debug, Clone)]
pub struct EditorBuffer {
    language: Language,
    code: String,
}

impl EditorBuffer {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            code: template(language).to_string(),
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn set_code(&mut self, code: impl Into<String>) {
        self.code = code.into();
    }

    pub fn switch_language(&mut self, language: Language) {
        if language == self.language {
            return;
        }
        self.language = language;
        self.code = template(language).to_string();
    }
}
