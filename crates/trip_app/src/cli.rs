use std::path::PathBuf;

use clap::{ArgAction, Parser};
use log::LevelFilter;
use trip_core::{Budget, TravelStyle, TripPreferences};

/// Research a trip with the planning backend, then ask questions about it.
#[derive(Debug, Clone, Parser)]
#[command(name = "trip-planner", version)]
pub struct Args {
    /// Where you are going
    pub destination: String,

    /// City or airport you leave from
    #[arg(long)]
    pub departing_from: Option<String>,

    /// Passport country, used for visa and entry rules
    #[arg(long)]
    pub nationality: Option<String>,

    /// Trip length in days (1-60)
    #[arg(short, long)]
    pub days: Option<u32>,

    /// Travel dates, free text ("flexible", "March 2026", ...)
    #[arg(long)]
    pub dates: Option<String>,

    /// Who is travelling ("2 adults, 1 child")
    #[arg(long)]
    pub travelers: Option<String>,

    /// budget, mid-range or luxury
    #[arg(long)]
    pub budget: Option<Budget>,

    /// adventure, cultural, relaxation, foodie or mixed
    #[arg(long)]
    pub style: Option<TravelStyle>,

    #[arg(long)]
    pub interests: Option<String>,

    #[arg(long)]
    pub special_requirements: Option<String>,

    /// Backend origin, e.g. http://localhost:8000
    #[arg(long)]
    pub api_url: Option<String>,

    /// Config file (defaults to ./trip_planner.ron when present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Where downloaded plans are written
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Write the log to this file (and the terminal with -v)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Exit once research finishes instead of reading questions from stdin
    #[arg(long)]
    pub no_chat: bool,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Preferences for the research job; unset flags keep their defaults.
    pub fn preferences(&self) -> TripPreferences {
        let mut prefs = TripPreferences::for_destination(self.destination.trim());
        if let Some(value) = &self.departing_from {
            prefs.departing_from = value.clone();
        }
        if let Some(value) = &self.nationality {
            prefs.nationality = value.clone();
        }
        if let Some(days) = self.days {
            prefs.days = days;
        }
        if let Some(value) = &self.dates {
            prefs.travel_dates = value.clone();
        }
        if let Some(value) = &self.travelers {
            prefs.travelers = value.clone();
        }
        if let Some(budget) = self.budget {
            prefs.budget = budget;
        }
        if let Some(style) = self.style {
            prefs.travel_style = style;
        }
        if let Some(value) = &self.interests {
            prefs.interests = value.clone();
        }
        if let Some(value) = &self.special_requirements {
            prefs.special_requirements = value.clone();
        }
        prefs
    }

    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}
