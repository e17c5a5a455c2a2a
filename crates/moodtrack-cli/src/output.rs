//! Plain-text output helpers

use moodtrack_core::models::{Mood, Patient, PatientMoodEntry};
use moodtrack_core::stats::MoodStats;
use moodtrack_core::utils::{format_average, format_date, truncate_string};

/// Width of the name column in patient listings
const NAME_WIDTH: usize = 24;

/// Width of the email column in patient listings
const EMAIL_WIDTH: usize = 28;

pub fn success(msg: &str) {
    println!("✓ {}", msg);
}

pub fn info(msg: &str) {
    println!("  {}", msg);
}

pub fn print_moods(moods: &[Mood]) {
    if moods.is_empty() {
        info("No moods recorded yet");
        return;
    }
    for mood in moods {
        println!("  {:>2}/10  {}", mood.rate, format_date(&mood.date));
    }
}

pub fn print_patient_moods(moods: &[PatientMoodEntry]) {
    if moods.is_empty() {
        info("No moods recorded yet");
        return;
    }
    for mood in moods {
        println!("  {:>2}/10  {}", mood.rate, format_date(&mood.date));
    }
}

pub fn print_stats(stats: &MoodStats) {
    println!(
        "  Average: {}   Entries: {}   Last 7 days: {} ({} days)",
        format_average(stats.average),
        stats.count,
        format_average(stats.week.average),
        stats.week.count
    );
}

pub fn print_patient_table(title: &str, patients: &[Patient]) {
    println!("{} ({})", title, patients.len());
    if patients.is_empty() {
        info("None");
        return;
    }
    println!(
        "  {:<10} {:<name_w$} {:<email_w$} {:>7} {:>7}",
        "ID",
        "NAME",
        "EMAIL",
        "SCORE",
        "ENTRIES",
        name_w = NAME_WIDTH,
        email_w = EMAIL_WIDTH
    );
    for patient in patients {
        println!(
            "  {:<10} {:<name_w$} {:<email_w$} {:>7} {:>7}",
            truncate_string(&patient.id, 10),
            truncate_string(&patient.name, NAME_WIDTH),
            truncate_string(&patient.email, EMAIL_WIDTH),
            format_average(patient.mood_score),
            patient.mood_count,
            name_w = NAME_WIDTH,
            email_w = EMAIL_WIDTH
        );
    }
}
