//! Reward catalog primitives.
//!
//! A `Reward` is one slot of the lucky wheel: a payout (money or points), a
//! selection weight and a presentation color. The catalog never enforces
//! that active weights sum to 1 — the distributor normalizes by the actual
//! total, and the admin surface reports the deviation for human review.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardKind {
    Points,
    Balance,
}

impl RewardKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Points => "points",
            Self::Balance => "balance",
        }
    }
}

impl TryFrom<&str> for RewardKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "points" => Ok(Self::Points),
            "balance" => Ok(Self::Balance),
            other => Err(EngineError::InvalidInput(format!(
                "invalid reward kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reward {
    pub id: Uuid,
    pub name: String,
    pub kind: RewardKind,
    /// Payout magnitude: minor units for `Balance`, points for `Points`.
    pub value: i64,
    /// Selection weight in `[0, 1]`.
    pub probability: f64,
    /// Presentation token (`#rrggbb`), used only by the wheel UI.
    pub color: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Reward {
    pub fn new(
        name: String,
        kind: RewardKind,
        value: i64,
        probability: f64,
        color: String,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        let name = validate_name(&name)?;
        validate_probability(probability)?;
        validate_value(value)?;
        let color = validate_color(&color)?;
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            kind,
            value,
            probability,
            color,
            is_active: true,
            created_at,
        })
    }
}

pub(crate) fn validate_name(raw: &str) -> ResultEngine<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidInput(
            "reward name must not be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn validate_probability(probability: f64) -> ResultEngine<()> {
    if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
        return Err(EngineError::InvalidInput(
            "probability must be within [0, 1]".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn validate_value(value: i64) -> ResultEngine<()> {
    if value < 0 {
        return Err(EngineError::InvalidInput(
            "reward value must be >= 0".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn validate_color(raw: &str) -> ResultEngine<String> {
    let trimmed = raw.trim();
    let hex = trimmed.strip_prefix('#').ok_or_else(|| {
        EngineError::InvalidInput("color must be a #rrggbb token".to_string())
    })?;
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(EngineError::InvalidInput(
            "color must be a #rrggbb token".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "rewards")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub kind: String,
    pub value: i64,
    pub probability: f64,
    pub color: String,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Reward> for ActiveModel {
    fn from(reward: &Reward) -> Self {
        Self {
            id: ActiveValue::Set(reward.id.to_string()),
            name: ActiveValue::Set(reward.name.clone()),
            kind: ActiveValue::Set(reward.kind.as_str().to_string()),
            value: ActiveValue::Set(reward.value),
            probability: ActiveValue::Set(reward.probability),
            color: ActiveValue::Set(reward.color.clone()),
            is_active: ActiveValue::Set(reward.is_active),
            created_at: ActiveValue::Set(reward.created_at),
        }
    }
}

impl TryFrom<Model> for Reward {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::NotFound("reward not exists".to_string()))?,
            name: model.name,
            kind: RewardKind::try_from(model.kind.as_str())?,
            value: model.value,
            probability: model.probability,
            color: model.color,
            is_active: model.is_active,
            created_at: model.created_at,
        })
    }
}
