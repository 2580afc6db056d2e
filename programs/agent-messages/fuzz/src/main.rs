//! Fuzz test runner for agent message acceptance
//!
//! Run with: cargo run --release -p agent-messages-fuzz --bin fuzz_all
//! Or: cargo test (for property-based tests)

use agent_messages_fuzz::*;
use proptest::prelude::*;
use proptest::strategy::ValueTree;
use proptest::test_runner::TestRunner;
use std::time::Instant;

fn main() {
    println!("=== Agent Messages Fuzz Testing ===\n");

    let start = Instant::now();
    let mut total_tests = 0;
    let mut passed = 0;
    let mut failed = 0;

    println!("Running register_agent fuzz tests...");
    let (p, f) = run_register_agent_fuzz(200);
    passed += p;
    failed += f;
    total_tests += p + f;

    println!("Running submit_message fuzz tests...");
    let (p, f) = run_submit_message_fuzz(200);
    passed += p;
    failed += f;
    total_tests += p + f;

    println!("Running submit_shielded_message fuzz tests...");
    let (p, f) = run_submit_shielded_message_fuzz(100);
    passed += p;
    failed += f;
    total_tests += p + f;

    println!("Running operation sequence fuzz tests...");
    let (p, f) = run_sequence_fuzz(50);
    passed += p;
    failed += f;
    total_tests += p + f;

    println!("Running reference scenario...");
    let (p, f) = run_reference_scenario();
    passed += p;
    failed += f;
    total_tests += p + f;

    let duration = start.elapsed();

    println!("\n=== Fuzz Testing Complete ===");
    println!("Total tests: {}", total_tests);
    println!("Passed: {}", passed);
    println!("Failed: {}", failed);
    println!("Duration: {:?}", duration);

    if failed > 0 {
        std::process::exit(1);
    }
}

fn tally(result: &SimulationResult, label: &str, iteration: usize) -> (usize, usize) {
    if result.is_invariant_violation() {
        println!("  FAIL [{label} #{iteration}]: {result:?}");
        (0, 1)
    } else {
        (1, 0)
    }
}

fn generate<S: Strategy>(strategy: S, runner: &mut TestRunner) -> Option<S::Value> {
    strategy
        .new_tree(runner)
        .ok()
        .map(|tree| tree.current())
}

fn run_register_agent_fuzz(iterations: usize) -> (usize, usize) {
    let mut passed = 0;
    let mut failed = 0;
    let mut runner = TestRunner::default();

    for i in 0..iterations {
        let Some(input) = generate(any::<RegisterAgentInput>(), &mut runner) else {
            failed += 1;
            continue;
        };

        let mut ledger = if input.shielded_policy {
            SimulatedLedger::shielded()
        } else {
            SimulatedLedger::plaintext()
        };
        let result = simulate_register_agent(&mut ledger, input.agent_id, &input.security_code);

        let (p, f) = tally(&result, "register_agent", i);
        passed += p;
        failed += f;
    }

    (passed, failed)
}

fn run_submit_message_fuzz(iterations: usize) -> (usize, usize) {
    let mut passed = 0;
    let mut failed = 0;
    let mut runner = TestRunner::default();

    for i in 0..iterations {
        let Some(input) = generate(any::<SubmitMessageInput>(), &mut runner) else {
            failed += 1;
            continue;
        };

        let mut ledger = SimulatedLedger::plaintext();
        if let Some(code) = &input.registered_code {
            ledger.seed_agent(input.agent_id, code, input.last_number);
        }
        let result = simulate_submit_message(
            &mut ledger,
            input.agent_id,
            input.message_number,
            &input.content,
            &input.security_code,
        );

        let (p, f) = tally(&result, "submit_message", i);
        passed += p;
        failed += f;
    }

    (passed, failed)
}

fn run_submit_shielded_message_fuzz(iterations: usize) -> (usize, usize) {
    let mut passed = 0;
    let mut failed = 0;
    let mut runner = TestRunner::default();

    for i in 0..iterations {
        let Some(input) = generate(any::<ShieldedSubmissionInput>(), &mut runner) else {
            failed += 1;
            continue;
        };

        let mut ledger = SimulatedLedger::shielded();
        ledger.seed_agent(input.agent_id, "jb", 0);
        let result = simulate_submit_shielded_message(
            &mut ledger,
            input.agent_id,
            input.message_number,
            &input.content,
            &input.security_code,
            input.tamper,
        );

        // Tampered attestations must never be accepted
        let result = if input.tamper != Tamper::None && result.is_success() {
            SimulationResult::InvariantViolation(format!("tampered input accepted: {input:?}"))
        } else {
            result
        };

        let (p, f) = tally(&result, "submit_shielded_message", i);
        passed += p;
        failed += f;
    }

    (passed, failed)
}

fn run_sequence_fuzz(iterations: usize) -> (usize, usize) {
    let mut passed = 0;
    let mut failed = 0;
    let mut runner = TestRunner::default();

    for i in 0..iterations {
        let Some(operations) = generate(arb_operations(40), &mut runner) else {
            failed += 1;
            continue;
        };

        let mut ledger = if i % 2 == 0 {
            SimulatedLedger::plaintext()
        } else {
            SimulatedLedger::shielded()
        };
        let results = simulate_operations(&mut ledger, &operations);

        match results.iter().find(|result| result.is_invariant_violation()) {
            Some(result) => {
                let (p, f) = tally(result, "sequence", i);
                passed += p;
                failed += f;
            }
            None => passed += 1,
        }
    }

    (passed, failed)
}

fn run_reference_scenario() -> (usize, usize) {
    let mut ledger = SimulatedLedger::plaintext();
    let steps = [
        simulate_submit_message(&mut ledger, 7, 1, "iamjamesbond", "jb"),
        simulate_register_agent(&mut ledger, 7, "jb"),
        simulate_submit_message(&mut ledger, 7, 1, "iamjamesbond", "jb"),
        simulate_submit_message(&mut ledger, 7, 2, "iamjamesbond", "aa"),
        simulate_submit_message(&mut ledger, 7, 3, "iamjames", "jb"),
        simulate_submit_message(&mut ledger, 7, 0, "iamjamesbond", "jb"),
    ];
    let expected = [false, true, true, false, false, false];

    let mut passed = 0;
    let mut failed = 0;
    for (i, (result, should_succeed)) in steps.iter().zip(expected).enumerate() {
        if result.is_invariant_violation() || result.is_success() != should_succeed {
            println!("  FAIL [reference #{i}]: {result:?}");
            failed += 1;
        } else {
            passed += 1;
        }
    }

    (passed, failed)
}
