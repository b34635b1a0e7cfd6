//! Property-based tests for wizard step gating
//!
//! Tests invariants:
//! - Every command moves the step by at most one
//! - `go_back` never validates and leaves no errors behind
//! - A single broken basic-info field blocks the step and is reported
//! - Valid data always reaches the final step after backing up

use chrono::Duration;
use proptest::prelude::*;

use crate::core::campaign::category::Category;
use crate::core::campaign::wizard::{
    Transition, ValidationIssue, WizardController, WizardField, WizardStep,
};
use crate::tests::common::{fill_basic_info, fixed_today, jpeg_of_size, wizard_at};

// ============================================================================
// Strategies for generating test inputs
// ============================================================================

#[derive(Debug, Clone)]
enum Command {
    Next,
    Back,
    PickCategory(usize),
    FillBasicInfo,
    ClearTitle,
    PickImage,
    RemoveImage,
}

fn arb_command() -> impl Strategy<Value = Command> {
    prop_oneof![
        3 => Just(Command::Next),
        2 => Just(Command::Back),
        1 => (0..Category::ALL.len()).prop_map(Command::PickCategory),
        1 => Just(Command::FillBasicInfo),
        1 => Just(Command::ClearTitle),
        1 => Just(Command::PickImage),
        1 => Just(Command::RemoveImage),
    ]
}

/// One way to break an otherwise valid basic-info step.
#[derive(Debug, Clone)]
enum Breakage {
    BlankTitle(String),
    BlankCity(String),
    BadGoal(String),
    PastDate(i64),
    NoDate,
}

fn arb_breakage() -> impl Strategy<Value = Breakage> {
    prop_oneof![
        "[ \t]{0,4}".prop_map(Breakage::BlankTitle),
        "[ \t]{0,4}".prop_map(Breakage::BlankCity),
        prop_oneof![
            Just("0".to_string()),
            Just("-50".to_string()),
            Just("abc".to_string()),
            Just("NaN".to_string()),
            "-[1-9][0-9]{0,5}",
            "[a-z]{1,6}",
        ]
        .prop_map(Breakage::BadGoal),
        (1i64..3650).prop_map(Breakage::PastDate),
        Just(Breakage::NoDate),
    ]
}

fn apply(wizard: &mut WizardController, command: &Command) -> Option<Transition> {
    match command {
        Command::Next => return Some(wizard.go_next()),
        Command::Back => {
            wizard.go_back();
        }
        Command::PickCategory(i) => wizard.select_category(Category::ALL[*i]),
        Command::FillBasicInfo => fill_basic_info(wizard),
        Command::ClearTitle => wizard.set_title(""),
        Command::PickImage => {
            let _ = wizard.select_image(jpeg_of_size(256));
        }
        Command::RemoveImage => wizard.remove_image(),
    }
    None
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Property: No command sequence skips a step or leaves the 1..=4 range
    #[test]
    fn prop_steps_move_by_at_most_one(
        commands in prop::collection::vec(arb_command(), 1..60)
    ) {
        let mut wizard = WizardController::new().with_today(fixed_today());

        for command in &commands {
            let before = wizard.current_step().number();
            let transition = apply(&mut wizard, command);
            let after = wizard.current_step().number();

            prop_assert!((1..=WizardStep::COUNT).contains(&after));
            prop_assert!(before.abs_diff(after) <= 1);

            match (command, transition) {
                (Command::Back, _) => {
                    prop_assert!(after <= before);
                    if before > 1 {
                        prop_assert!(wizard.errors().is_empty());
                    }
                }
                (_, Some(Transition::Advanced(step))) => {
                    prop_assert_eq!(step.number(), before + 1);
                }
                (_, Some(Transition::Blocked)) => {
                    prop_assert_eq!(after, before);
                    prop_assert!(!wizard.errors().is_empty());
                }
                (_, Some(_)) => {
                    // Submission outcomes never move the step
                    prop_assert_eq!(after, before);
                }
                (_, None) => prop_assert_eq!(after, before),
            }
        }
    }

    /// Property: Any single broken field blocks basic info with that field flagged
    #[test]
    fn prop_broken_basic_info_blocks(breakage in arb_breakage()) {
        let mut wizard = wizard_at(WizardStep::BasicInfo);
        fill_basic_info(&mut wizard);

        let field = match &breakage {
            Breakage::BlankTitle(v) => {
                wizard.set_title(v);
                WizardField::Title
            }
            Breakage::BlankCity(v) => {
                wizard.set_city(v);
                WizardField::City
            }
            Breakage::BadGoal(v) => {
                wizard.set_donation_goal(v);
                WizardField::DonationGoal
            }
            Breakage::PastDate(days) => {
                wizard.set_end_date(Some(fixed_today() - Duration::days(*days)));
                WizardField::EndDate
            }
            Breakage::NoDate => {
                wizard.set_end_date(None);
                WizardField::EndDate
            }
        };

        prop_assert_eq!(wizard.go_next(), Transition::Blocked);
        prop_assert_eq!(wizard.current_step(), WizardStep::BasicInfo);
        prop_assert!(wizard.error_for(field).is_some());
        prop_assert_eq!(wizard.errors().len(), 1);
        if let Breakage::PastDate(_) = breakage {
            prop_assert_eq!(wizard.error_for(field), Some(&ValidationIssue::InvalidDate));
        }
    }

    /// Property: With valid data, backing up k steps then advancing k returns to the end
    #[test]
    fn prop_back_then_forward_returns(k in 0usize..WizardStep::COUNT) {
        let mut wizard = wizard_at(WizardStep::Description);

        for _ in 0..k {
            wizard.go_back();
        }
        prop_assert_eq!(wizard.current_step().number(), WizardStep::COUNT - k);

        for _ in 0..k {
            let advanced = matches!(wizard.go_next(), Transition::Advanced(_));
            prop_assert!(advanced);
        }
        prop_assert_eq!(wizard.current_step(), WizardStep::Description);
    }

    /// Property: The end date equal to today is never rejected
    #[test]
    fn prop_today_and_later_accepted(days_ahead in 0i64..3650) {
        let mut wizard = wizard_at(WizardStep::BasicInfo);
        fill_basic_info(&mut wizard);
        wizard.set_end_date(Some(fixed_today() + Duration::days(days_ahead)));

        prop_assert_eq!(wizard.go_next(), Transition::Advanced(WizardStep::Media));
    }
}
