use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, Value, ValueRef};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use super::{CheckIn, Note};
use crate::error::Result;
use crate::validate;

pub const NAME_MAX_LEN: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Habit {
    pub id: i64,
    pub name: String,
    pub frequency: Frequency,
    pub category: Category,
    pub start_date: NaiveDate,
    #[serde(skip_serializing, default)]
    pub created_at: DateTime<Utc>,
    pub checkins: Vec<CheckIn>,
    pub notes: Vec<Note>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    #[default]
    Daily,
    Weekly,
}

impl Frequency {
    pub const ALL: [&'static str; 2] = ["daily", "weekly"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[default]
    Health,
    Work,
    Learning,
    Fitness,
    #[serde(alias = "mental health")]
    MentalHealth,
    Productivity,
}

impl Category {
    pub const ALL: [&'static str; 6] = [
        "health",
        "work",
        "learning",
        "fitness",
        "mental_health",
        "productivity",
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Health => "health",
            Self::Work => "work",
            Self::Learning => "learning",
            Self::Fitness => "fitness",
            Self::MentalHealth => "mental_health",
            Self::Productivity => "productivity",
        }
    }

    /// Also accepts "mental health", the spelling older clients send.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "health" => Some(Self::Health),
            "work" => Some(Self::Work),
            "learning" => Some(Self::Learning),
            "fitness" => Some(Self::Fitness),
            "mental_health" | "mental health" => Some(Self::MentalHealth),
            "productivity" => Some(Self::Productivity),
            _ => None,
        }
    }
}

macro_rules! text_column {
    ($ty:ident, $label:literal) => {
        impl ToSql for $ty {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(self.as_str().into())
            }
        }

        impl FromSql for $ty {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                let s = value.as_str()?;
                Self::from_str(s)
                    .ok_or_else(|| FromSqlError::Other(format!("unknown {} {:?}", $label, s).into()))
            }
        }
    };
}

text_column!(Frequency, "frequency");
text_column!(Category, "category");

/// Raw habit payload as sent by clients. Every field is optional here so that
/// create, replace and patch can report missing fields by name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HabitInput {
    pub name: Option<String>,
    pub frequency: Option<String>,
    pub category: Option<String>,
    pub start_date: Option<String>,
}

/// A fully validated habit definition, ready to insert or to replace an
/// existing row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHabit {
    pub name: String,
    pub frequency: Frequency,
    pub category: Category,
    pub start_date: NaiveDate,
}

/// Validated partial update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HabitChanges {
    pub name: Option<String>,
    pub frequency: Option<Frequency>,
    pub category: Option<Category>,
    pub start_date: Option<NaiveDate>,
}

impl HabitInput {
    /// Validates a complete definition; frequency and category fall back to
    /// their defaults when omitted.
    pub fn validate_new(&self) -> Result<NewHabit> {
        let name = validate::bounded_text("name", self.name.as_deref(), NAME_MAX_LEN)?;
        let frequency = match self.frequency.as_deref() {
            Some(raw) => parse_frequency(raw)?,
            None => Frequency::default(),
        };
        let category = match self.category.as_deref() {
            Some(raw) => parse_category(raw)?,
            None => Category::default(),
        };
        let start_date = validate::required_date("start_date", self.start_date.as_deref())?;

        Ok(NewHabit {
            name,
            frequency,
            category,
            start_date,
        })
    }

    pub fn validate_changes(&self) -> Result<HabitChanges> {
        Ok(HabitChanges {
            name: self
                .name
                .as_deref()
                .map(|raw| validate::bounded_text("name", Some(raw), NAME_MAX_LEN))
                .transpose()?,
            frequency: self.frequency.as_deref().map(parse_frequency).transpose()?,
            category: self.category.as_deref().map(parse_category).transpose()?,
            start_date: self
                .start_date
                .as_deref()
                .map(|raw| validate::required_date("start_date", Some(raw)))
                .transpose()?,
        })
    }
}

fn parse_frequency(raw: &str) -> Result<Frequency> {
    validate::choice("frequency", raw, Frequency::from_str, &Frequency::ALL)
}

fn parse_category(raw: &str) -> Result<Category> {
    validate::choice("category", raw, Category::from_str, &Category::ALL)
}

impl HabitChanges {
    pub fn apply_to(self, habit: &Habit) -> NewHabit {
        NewHabit {
            name: self.name.unwrap_or_else(|| habit.name.clone()),
            frequency: self.frequency.unwrap_or(habit.frequency),
            category: self.category.unwrap_or(habit.category),
            start_date: self.start_date.unwrap_or(habit.start_date),
        }
    }
}

/// Listing filter, mirroring what the admin listing offered.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HabitFilter {
    pub frequency: Option<Frequency>,
    pub category: Option<Category>,
    /// Case-insensitive substring of the habit name.
    pub search: Option<String>,
}

const HABIT_COLUMNS: &str = "id, name, frequency, category, start_date, created_at";

impl Habit {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            frequency: row.get("frequency")?,
            category: row.get("category")?,
            start_date: row.get("start_date")?,
            created_at: row.get("created_at")?,
            checkins: Vec::new(),
            notes: Vec::new(),
        })
    }

    fn load_children(mut self, conn: &Connection) -> Result<Self> {
        self.checkins = CheckIn::list_by_habit(conn, self.id)?;
        self.notes = Note::list_by_habit(conn, self.id)?;
        Ok(self)
    }

    pub fn insert(conn: &Connection, new: &NewHabit, created_at: DateTime<Utc>) -> Result<Self> {
        conn.execute(
            "INSERT INTO habits (name, frequency, category, start_date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![new.name, new.frequency, new.category, new.start_date, created_at],
        )?;

        Ok(Self {
            id: conn.last_insert_rowid(),
            name: new.name.clone(),
            frequency: new.frequency,
            category: new.category,
            start_date: new.start_date,
            created_at,
            checkins: Vec::new(),
            notes: Vec::new(),
        })
    }

    pub fn exists(conn: &Connection, id: i64) -> Result<bool> {
        let found = conn
            .query_row("SELECT 1 FROM habits WHERE id = ?1", [id], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    /// Loads a habit together with its check-ins and notes.
    pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Self>> {
        let habit = conn
            .query_row(
                &format!("SELECT {HABIT_COLUMNS} FROM habits WHERE id = ?1"),
                [id],
                Self::from_row,
            )
            .optional()?;

        habit.map(|h| h.load_children(conn)).transpose()
    }

    pub fn list(conn: &Connection, filter: &HabitFilter) -> Result<Vec<Self>> {
        let mut sql = format!("SELECT {HABIT_COLUMNS} FROM habits WHERE 1 = 1");
        let mut bind: Vec<Value> = Vec::new();

        if let Some(frequency) = filter.frequency {
            sql.push_str(" AND frequency = ?");
            bind.push(Value::Text(frequency.as_str().to_string()));
        }
        if let Some(category) = filter.category {
            sql.push_str(" AND category = ?");
            bind.push(Value::Text(category.as_str().to_string()));
        }
        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            sql.push_str(" AND instr(lower(name), lower(?)) > 0");
            bind.push(Value::Text(search.to_string()));
        }
        sql.push_str(" ORDER BY id");

        let mut stmt = conn.prepare(&sql)?;
        let habits = stmt
            .query_map(params_from_iter(bind), Self::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        habits.into_iter().map(|h| h.load_children(conn)).collect()
    }

    /// Overwrites the editable fields. Returns false if no such habit exists.
    pub fn update(conn: &Connection, id: i64, new: &NewHabit) -> Result<bool> {
        let changed = conn.execute(
            "UPDATE habits SET name = ?1, frequency = ?2, category = ?3, start_date = ?4
             WHERE id = ?5",
            params![new.name, new.frequency, new.category, new.start_date, id],
        )?;
        Ok(changed > 0)
    }

    /// Deletes the habit and everything it owns. Callers should run this
    /// inside a transaction so children and parent go together.
    pub fn delete(conn: &Connection, id: i64) -> Result<bool> {
        conn.execute("DELETE FROM checkins WHERE habit_id = ?1", [id])?;
        conn.execute("DELETE FROM notes WHERE habit_id = ?1", [id])?;
        let changed = conn.execute("DELETE FROM habits WHERE id = ?1", [id])?;
        Ok(changed > 0)
    }
}
