//! お知らせ一覧
//!
//! 表示用のメモリ上のリスト。スケジューリングは扱わない。

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// お知らせ1件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub read: bool,
}

/// お知らせ一覧
#[derive(Debug, Clone, Default)]
pub struct NotificationCenter {
    notifications: Vec<Notification>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// サンプルデータ（`now` 基準の相対時刻）
    pub fn sample(now: DateTime<Utc>) -> Self {
        let notifications = [
            ("1", "Water your Rose plant", "Your Rose plant needs watering today", Duration::hours(2), false),
            ("2", "Fertilizer reminder", "Time to add fertilizer to your Monstera", Duration::days(1), true),
            ("3", "Light adjustment needed", "Your Snake Plant needs more sunlight", Duration::days(2), true),
            ("4", "New plant care tip", "Check out our latest guide on indoor plants", Duration::days(3), false),
            ("5", "Plant health alert", "Possible pest detected on your Fiddle Leaf Fig", Duration::days(5), true),
        ]
        .into_iter()
        .map(|(id, title, message, age, read)| Notification {
            id: id.to_string(),
            title: title.to_string(),
            message: message.to_string(),
            created_at: now - age,
            read,
        })
        .collect();

        Self { notifications }
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn push(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    pub fn unread_count(&self) -> usize {
        self.notifications.iter().filter(|n| !n.read).count()
    }

    /// 既読にする。該当IDがなければ false
    pub fn mark_read(&mut self, id: &str) -> bool {
        match self.notifications.iter_mut().find(|n| n.id == id) {
            Some(n) => {
                n.read = true;
                true
            }
            None => false,
        }
    }

    pub fn clear_all(&mut self) {
        self.notifications.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }
}

/// 相対時刻の表示（"2 hours ago" など）
pub fn relative_time(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now - created_at;

    let (count, unit) = if elapsed.num_days() >= 1 {
        (elapsed.num_days(), "day")
    } else if elapsed.num_hours() >= 1 {
        (elapsed.num_hours(), "hour")
    } else if elapsed.num_minutes() >= 1 {
        (elapsed.num_minutes(), "minute")
    } else {
        return "just now".to_string();
    };

    if count == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", count, unit)
    }
}
