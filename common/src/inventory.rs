//! 手持ちの植物リスト
//!
//! 永続化はしない。所有されたコレクションとしてアクセサ経由でのみ変更する。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 植物の健康状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Health {
    #[default]
    Good,
    Warning,
    Danger,
}

impl Health {
    /// 文字列から変換（不明な値は Good）
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "warning" => Health::Warning,
            "danger" => Health::Danger,
            _ => Health::Good,
        }
    }
}

impl fmt::Display for Health {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Health::Good => write!(f, "good"),
            Health::Warning => write!(f, "warning"),
            Health::Danger => write!(f, "danger"),
        }
    }
}

/// 植物1件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plant {
    pub id: String,
    pub name: String,
    pub species: String,
    /// 画像への参照
    #[serde(default)]
    pub image: Option<String>,
    pub days_until_watering: u32,
    #[serde(default)]
    pub health: Health,
}

/// 植物リスト
#[derive(Debug, Clone, Default)]
pub struct PlantInventory {
    plants: Vec<Plant>,
}

impl PlantInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// サンプルデータ入りのリスト
    pub fn sample() -> Self {
        let plants = [
            ("1", "Fiddle Leaf Fig", "Ficus lyrata", "plant9.jpg", 3, Health::Good),
            ("2", "Snake Plant", "Sansevieria", "plant10.jpg", 7, Health::Warning),
            ("3", "Monstera", "Monstera deliciosa", "plant11.jpg", 5, Health::Good),
        ]
        .into_iter()
        .map(|(id, name, species, image, days, health)| Plant {
            id: id.to_string(),
            name: name.to_string(),
            species: species.to_string(),
            image: Some(image.to_string()),
            days_until_watering: days,
            health,
        })
        .collect();

        Self { plants }
    }

    pub fn plants(&self) -> &[Plant] {
        &self.plants
    }

    pub fn get(&self, id: &str) -> Option<&Plant> {
        self.plants.iter().find(|p| p.id == id)
    }

    /// 植物を追加し、割り当てたIDを返す
    pub fn add(&mut self, name: &str, species: &str, days_until_watering: u32) -> String {
        let next = self
            .plants
            .iter()
            .filter_map(|p| p.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0)
            + 1;
        let id = next.to_string();

        self.plants.push(Plant {
            id: id.clone(),
            name: name.to_string(),
            species: species.to_string(),
            image: None,
            days_until_watering,
            health: Health::Good,
        });
        id
    }

    pub fn remove(&mut self, id: &str) -> Option<Plant> {
        let idx = self.plants.iter().position(|p| p.id == id)?;
        Some(self.plants.remove(idx))
    }

    /// `days` 日以内に水やりが必要な植物（残り日数順）
    pub fn due_within(&self, days: u32) -> Vec<&Plant> {
        let mut due: Vec<&Plant> = self
            .plants
            .iter()
            .filter(|p| p.days_until_watering <= days)
            .collect();
        due.sort_by_key(|p| p.days_until_watering);
        due
    }

    pub fn len(&self) -> usize {
        self.plants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_inventory() {
        let inventory = PlantInventory::sample();
        assert_eq!(inventory.len(), 3);
        assert_eq!(inventory.plants()[1].name, "Snake Plant");
        assert_eq!(inventory.plants()[1].health, Health::Warning);
    }

    #[test]
    fn test_add_assigns_next_id() {
        let mut inventory = PlantInventory::sample();
        let id = inventory.add("Rose", "Rosa", 2);
        assert_eq!(id, "4");
        assert_eq!(inventory.get("4").map(|p| p.species.as_str()), Some("Rosa"));

        let mut empty = PlantInventory::new();
        assert_eq!(empty.add("Fern", "Nephrolepis", 1), "1");
    }

    #[test]
    fn test_remove() {
        let mut inventory = PlantInventory::sample();
        let removed = inventory.remove("2").unwrap();
        assert_eq!(removed.name, "Snake Plant");
        assert!(inventory.remove("2").is_none());
        assert_eq!(inventory.len(), 2);
    }

    #[test]
    fn test_due_within_sorted() {
        let inventory = PlantInventory::sample();
        let due: Vec<_> = inventory.due_within(5).iter().map(|p| p.id.as_str()).collect();
        assert_eq!(due, vec!["1", "3"]);
        assert!(inventory.due_within(0).is_empty());
    }

    #[test]
    fn test_health_parse() {
        assert_eq!(Health::parse("warning"), Health::Warning);
        assert_eq!(Health::parse(" DANGER "), Health::Danger);
        assert_eq!(Health::parse("unknown"), Health::Good);
        assert_eq!(Health::Danger.to_string(), "danger");
    }
}
