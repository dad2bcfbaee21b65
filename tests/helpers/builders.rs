use brewlog::entities::{brew, brewer, brewery};
use brewlog::storage::{self, BrewInput, BreweryInput, NewBrewer, StepInput, StepWrite};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;

/// Builder for creating test brewers
pub struct BrewerBuilder {
    name: String,
    email: Option<String>,
    is_public: bool,
}

impl BrewerBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            email: None,
            is_public: true,
        }
    }

    pub fn with_email(mut self, email: &str) -> Self {
        self.email = Some(email.to_string());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.is_public = false;
        self
    }

    pub fn public(mut self, is_public: bool) -> Self {
        self.is_public = is_public;
        self
    }

    pub async fn create(self, db: &DatabaseConnection) -> brewer::Model {
        storage::create_brewer(
            db,
            NewBrewer {
                name: self.name,
                email: self.email,
                is_public: self.is_public,
            },
        )
        .await
        .expect("Failed to create test brewer")
    }
}

/// Builder for creating test breweries
pub struct BreweryBuilder {
    brewer_id: i32,
    name: String,
    description: Option<String>,
}

impl BreweryBuilder {
    pub fn new(brewer_id: i32) -> Self {
        Self {
            brewer_id,
            name: "Test Brewery".to_string(),
            description: None,
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub async fn create(self, db: &DatabaseConnection) -> brewery::Model {
        storage::create_brewery(
            db,
            self.brewer_id,
            BreweryInput {
                name: self.name,
                description: self.description,
                established_date: None,
            },
        )
        .await
        .expect("Failed to create test brewery")
    }
}

/// Builder for creating test brews
pub struct BrewBuilder {
    brewery_id: i32,
    input: BrewInput,
}

impl BrewBuilder {
    pub fn new(brewery_id: i32) -> Self {
        Self {
            brewery_id,
            input: BrewInput {
                name: "Test Brew".to_string(),
                is_public: true,
                ..Default::default()
            },
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.input.name = name.to_string();
        self
    }

    pub fn public(mut self, is_public: bool) -> Self {
        self.input.is_public = is_public;
        self
    }

    pub fn draft(mut self) -> Self {
        self.input.is_draft = true;
        self
    }

    pub fn brewed(mut self, date: NaiveDate) -> Self {
        self.input.date_brewed = Some(date);
        self
    }

    pub fn bottled(mut self, date: NaiveDate) -> Self {
        self.input.bottling_date = Some(date);
        self
    }

    pub fn carbonation(mut self, carbonation_type: &str, level: &str) -> Self {
        self.input.carbonation_type = Some(carbonation_type.to_string());
        self.input.carbonation_level = Some(level.to_string());
        self
    }

    pub async fn create(self, db: &DatabaseConnection) -> brew::Model {
        storage::create_brew(db, self.brewery_id, self.input)
            .await
            .expect("Failed to create test brew")
    }
}

/// Builder for inserting test fermentation steps
pub struct StepBuilder {
    brew_id: i32,
    input: StepInput,
}

impl StepBuilder {
    pub fn new(brew_id: i32, date: NaiveDate) -> Self {
        Self {
            brew_id,
            input: StepInput {
                date,
                name: None,
                og: None,
                fg: None,
                volume: None,
                temperature: None,
                notes: None,
            },
        }
    }

    pub fn og(mut self, og: f64) -> Self {
        self.input.og = Some(og);
        self
    }

    pub fn fg(mut self, fg: f64) -> Self {
        self.input.fg = Some(fg);
        self
    }

    pub fn volume(mut self, volume: f64) -> Self {
        self.input.volume = Some(volume);
        self
    }

    pub fn named(mut self, name: &str) -> Self {
        self.input.name = Some(name.to_string());
        self
    }

    pub async fn create(self, db: &DatabaseConnection) -> StepWrite {
        storage::insert_step(db, self.brew_id, self.input)
            .await
            .expect("Failed to insert test step")
    }
}
