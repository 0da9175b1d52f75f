mod audio;
mod config;
mod mfcc;
mod paths;
mod validation;
mod voice;

use audio::capture::MicRecorder;
use config::AppConfig;
use mfcc::MfccExtractor;
use paths::{AppPaths, RecordingPaths};
use std::io::{self, BufRead, Write};
use validation::validate_username;
use voice::{authenticate, enroll, AuthOutcome, EnrollOutcome, FingerprintStore};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Faults are reported, never thrown: the process exits normally either way
    if let Err(e) = run() {
        eprintln!("✗ {:#}", e);
    }
}

fn run() -> anyhow::Result<()> {
    let paths = AppPaths::new()?;
    paths.ensure_directories()?;
    let config = AppConfig::load_or_create(&paths.config_file())?;

    let store = FingerprintStore::new(&config.storage.root);
    let recordings = RecordingPaths::new(&config.storage.root);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    println!();
    println!("Voice Authentication");
    println!("  1. Enroll");
    println!("  2. Authenticate");
    println!("  3. List enrolled users");
    println!("  4. Delete user");
    let choice = prompt(&mut lines, "Choose (1-4): ")?;

    match choice.as_str() {
        "1" => {
            if let Some(username) = prompt_username(&mut lines)? {
                let mut recorder = MicRecorder::new(config.recording.clone());
                let extractor = MfccExtractor::new(config.features.clone());
                render_enroll(enroll(
                    &username,
                    &mut recorder,
                    &extractor,
                    &store,
                    &recordings,
                ));
            }
        }
        "2" => {
            if let Some(username) = prompt_username(&mut lines)? {
                let mut recorder = MicRecorder::new(config.recording.clone());
                let extractor = MfccExtractor::new(config.features.clone());
                render_auth(authenticate(
                    &username,
                    &mut recorder,
                    &extractor,
                    &store,
                    &recordings,
                    config.auth.threshold,
                ));
            }
        }
        "3" => match store.list() {
            Ok(users) if users.is_empty() => println!("No users enrolled."),
            Ok(users) => {
                for user in users {
                    println!("  {}", user);
                }
            }
            Err(e) => println!("✗ Could not list users: {}", e),
        },
        "4" => {
            if let Some(username) = prompt_username(&mut lines)? {
                match store.delete(&username) {
                    Ok(()) => println!("✓ Deleted '{}'", username),
                    Err(e) => println!("✗ {}", e),
                }
            }
        }
        other => println!("⚠ Invalid option: '{}'", other),
    }

    Ok(())
}

fn prompt(
    lines: &mut impl Iterator<Item = io::Result<String>>,
    label: &str,
) -> anyhow::Result<String> {
    print!("{}", label);
    io::stdout().flush()?;

    let line = lines.next().transpose()?.unwrap_or_default();
    Ok(line.trim().to_string())
}

/// Ask for a username; an invalid one is reported and yields None
fn prompt_username(
    lines: &mut impl Iterator<Item = io::Result<String>>,
) -> anyhow::Result<Option<String>> {
    let raw = prompt(lines, "Enter username: ")?;
    match validate_username(&raw) {
        Ok(username) => Ok(Some(username)),
        Err(e) => {
            println!("⚠ {}", e);
            Ok(None)
        }
    }
}

fn render_enroll(outcome: EnrollOutcome) {
    match outcome {
        EnrollOutcome::Enrolled { username, dimensions } => {
            println!("✓ Enrolled '{}' ({} coefficients)", username, dimensions)
        }
        EnrollOutcome::RecordingFailed(reason) => println!("✗ Recording failed: {}", reason),
        EnrollOutcome::ExtractionFailed(reason) => {
            println!("✗ Feature extraction failed: {}", reason)
        }
        EnrollOutcome::StoreFailed(reason) => {
            println!("✗ Could not save fingerprint: {}", reason)
        }
    }
}

fn render_auth(outcome: AuthOutcome) {
    match outcome {
        AuthOutcome::NotEnrolled => println!("✗ User not found. Please enroll first."),
        AuthOutcome::RecordingFailed(reason) => println!("✗ Recording failed: {}", reason),
        AuthOutcome::ExtractionFailed(reason) => {
            println!("✗ Couldn't extract features from test voice: {}", reason)
        }
        AuthOutcome::StoreFailed(reason) => {
            println!("✗ Could not load fingerprint: {}", reason)
        }
        AuthOutcome::Decision { score, granted, .. } => {
            println!("Similarity: {:.2}", score);
            if granted {
                println!("✓ Access granted");
            } else {
                println!("✗ Access denied");
            }
        }
    }
}
