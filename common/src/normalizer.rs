//! 属性正規化モジュール
//!
//! 判定結果の任意にネストした値（オブジェクト・配列・スカラー）を、
//! 表示用のフラットなレコード列に変換する。
//!
//! ## 規則
//! - オブジェクト: 宣言順に走査し、除外キーは丸ごと捨てる
//! - 配列: 要素ごとに空キーのレコードを作る
//! - スカラー: 表示用文字列（`null` は `"null"`）
//! - 空のオブジェクト・配列はレコードを生成しない

use crate::json::Json;
use serde::Serialize;
use std::collections::HashSet;

/// 表示から除外する既定のキー（類似画像・内部ID・確率）
pub const DEFAULT_EXCLUDED_KEYS: &[&str] = &["similar_images", "id", "probability"];

/// 表示用レコード1行
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldRecord {
    /// 元のキー（配列要素は空文字）
    pub key: String,
    /// ネストの深さ（子は親+1）
    pub depth: usize,
    pub value: FieldValue,
}

/// レコードの値: スカラー文字列か、空でない子レコード列
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Children(Vec<FieldRecord>),
}

impl FieldRecord {
    /// 表示用キー（アンダースコアを空白に置換）
    pub fn display_key(&self) -> String {
        display_key(&self.key)
    }

    pub fn text(&self) -> Option<&str> {
        match &self.value {
            FieldValue::Text(s) => Some(s),
            FieldValue::Children(_) => None,
        }
    }

    pub fn children(&self) -> &[FieldRecord] {
        match &self.value {
            FieldValue::Children(c) => c,
            FieldValue::Text(_) => &[],
        }
    }
}

/// 除外キー集合
pub fn excluded_keys(keys: &[&str]) -> HashSet<String> {
    keys.iter().map(|k| k.to_string()).collect()
}

/// キーの表示変換（検索・比較には使わない）
pub fn display_key(key: &str) -> String {
    key.replace('_', " ")
}

/// 任意のJSON値をレコード列に正規化する
///
/// # Arguments
/// * `value` - 正規化対象
/// * `excluded` - 全階層で除外するキー
/// * `depth` - 生成するレコードの深さ（トップレベルは0）
pub fn normalize(value: &Json, excluded: &HashSet<String>, depth: usize) -> Vec<FieldRecord> {
    match value {
        Json::Object(entries) => normalize_entries(entries, excluded, depth),
        Json::Array(items) => items
            .iter()
            .filter_map(|item| element_record(item, excluded, depth + 1))
            .collect(),
        scalar => vec![FieldRecord {
            key: String::new(),
            depth,
            value: FieldValue::Text(scalar.display_text()),
        }],
    }
}

/// 分解済みのオブジェクト（キーと値の組）を正規化する
pub fn normalize_entries(
    entries: &[(String, Json)],
    excluded: &HashSet<String>,
    depth: usize,
) -> Vec<FieldRecord> {
    entries
        .iter()
        .filter(|(key, _)| !excluded.contains(key))
        .filter_map(|(key, value)| {
            let value = field_value(value, excluded, depth)?;
            Some(FieldRecord { key: key.clone(), depth, value })
        })
        .collect()
}

/// 配列要素1つ分のレコード
fn element_record(item: &Json, excluded: &HashSet<String>, depth: usize) -> Option<FieldRecord> {
    let value = field_value(item, excluded, depth)?;
    Some(FieldRecord { key: String::new(), depth, value })
}

/// レコード `depth` に置かれる値を作る。空コンテナは `None`
fn field_value(value: &Json, excluded: &HashSet<String>, depth: usize) -> Option<FieldValue> {
    let children = match value {
        Json::Object(entries) => normalize_entries(entries, excluded, depth + 1),
        Json::Array(items) => items
            .iter()
            .filter_map(|item| element_record(item, excluded, depth + 1))
            .collect(),
        scalar => return Some(FieldValue::Text(scalar.display_text())),
    };

    if children.is_empty() {
        None
    } else {
        Some(FieldValue::Children(children))
    }
}

/// レコード総数（子を含む）
pub fn count_records(records: &[FieldRecord]) -> usize {
    records
        .iter()
        .map(|r| 1 + count_records(r.children()))
        .sum()
}

/// テキスト表示用に行へ展開する
///
/// 深さごとに2スペースでインデントし、キーのない配列要素は `- ` で始める。
pub fn render_lines(records: &[FieldRecord]) -> Vec<String> {
    let mut lines = Vec::new();
    for record in records {
        render_record(record, &mut lines);
    }
    lines
}

fn render_record(record: &FieldRecord, lines: &mut Vec<String>) {
    let indent = "  ".repeat(record.depth);
    let label = if record.key.is_empty() {
        "- ".to_string()
    } else {
        format!("{}: ", record.display_key())
    };

    match &record.value {
        FieldValue::Text(text) => lines.push(format!("{}{}{}", indent, label, text)),
        FieldValue::Children(children) => {
            lines.push(format!("{}{}", indent, label.trim_end()));
            for child in children {
                render_record(child, lines);
            }
        }
    }
}
