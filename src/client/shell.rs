use chrono::{Duration, NaiveDate};

use super::period::{month_range, week_range, PeriodKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Day,
    Week,
    Month,
    Exercises,
}

/// What the front end should render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Main(View),
}

/// Top-level navigation state: the active view and the selected date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shell {
    pub view: View,
    pub date: NaiveDate,
}

impl Shell {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            view: View::Day,
            date: today,
        }
    }

    pub fn set_view(&mut self, view: View) {
        self.view = view;
    }

    /// Jump to a single day, e.g. from a month grid cell.
    pub fn open_day(&mut self, date: NaiveDate) {
        self.date = date;
        self.view = View::Day;
    }

    pub fn previous(&mut self) {
        self.date = self.step(-1);
    }

    pub fn next(&mut self) {
        self.date = self.step(1);
    }

    pub fn week_start(&self) -> NaiveDate {
        week_range(self.date).0
    }

    pub fn month_start(&self) -> NaiveDate {
        month_range(self.date).0
    }

    /// Header text for the active view.
    pub fn label(&self) -> String {
        match self.view {
            View::Day => self.date.format("%A, %B %-d, %Y").to_string(),
            View::Week => format!("Week of {}", self.week_start().format("%B %-d, %Y")),
            View::Month | View::Exercises => self.month_start().format("%B %Y").to_string(),
        }
    }

    pub fn screen(&self, authenticated: bool) -> Screen {
        if authenticated {
            Screen::Main(self.view)
        } else {
            Screen::Login
        }
    }

    fn step(&self, steps: i32) -> NaiveDate {
        match self.view {
            View::Day => self.date + Duration::days(i64::from(steps)),
            View::Week => PeriodKind::Week.shift(self.date, steps),
            View::Month => PeriodKind::Month.shift(self.date, steps),
            View::Exercises => self.date,
        }
    }
}
