//! Doctor command - check which external tools are available

use crate::tools::process::is_tool_installed;
use anyhow::Result;

const EXTERNAL_TOOLS: &[(&str, &str)] = &[
    ("cppcheck", "static analysis"),
    ("clang-tidy", "clang analyzer checks"),
    ("lizard", "complexity and duplication"),
    ("KWStyle", "style checking"),
    ("infer", "deep static analysis"),
];

pub fn run() -> Result<()> {
    println!("Codegauge Doctor\n");

    let mut missing = 0;
    for (binary, purpose) in EXTERNAL_TOOLS {
        if is_tool_installed(binary) {
            println!("✓ {binary}: installed ({purpose})");
        } else {
            missing += 1;
            println!("○ {binary}: not found ({purpose}) - it will be excluded from the score");
        }
    }

    println!();
    println!("Assertion and test-code scanning need no external tools.");
    println!(
        "Compiler and sanitizer scores come from your own build: pass \
         --compiler-log / --compiler-warnings and --sanitizer-log."
    );

    if missing == 0 {
        println!("\n✅ All external tools found!");
    } else {
        println!("\n{missing} tool(s) missing; their scores will be excluded.");
    }

    Ok(())
}
