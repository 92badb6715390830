//! 店舗不明時の対話式入力
//!
//! `--ask` 指定時のみ使用。店舗IDを入力するか、スキップ/ランダムIDを選ぶ。

use crate::error::{Result, SlipPdfError};
use dialoguer::Input;
use slip_pdf_common::matcher::is_valid_location_id;
use tracing::warn;

/// 対話の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// 入力された店舗IDを使う
    Use(String),
    /// このファイルは処理しない（元ファイルはそのまま）
    Skip,
    /// ランダムIDで命名
    Fallback,
}

pub trait Disambiguator {
    fn decide(&self, file_name: &str, recognized_text: &str) -> Result<Decision>;
}

pub struct PromptDisambiguator {
    candidates: Vec<String>,
}

impl PromptDisambiguator {
    pub fn new(candidates: Vec<String>) -> Self {
        Self { candidates }
    }
}

impl Disambiguator for PromptDisambiguator {
    fn decide(&self, file_name: &str, recognized_text: &str) -> Result<Decision> {
        println!("\n店舗を特定できませんでした: {}", file_name);
        let preview: String = recognized_text.chars().take(200).collect();
        if !preview.trim().is_empty() {
            println!("  認識テキスト: {}", preview.replace('\n', " "));
        }
        if !self.candidates.is_empty() {
            let numbered: Vec<String> = self
                .candidates
                .iter()
                .enumerate()
                .map(|(i, c)| format!("{}:{}", i + 1, c))
                .collect();
            println!("  候補: {}", numbered.join(", "));
        }

        loop {
            let input: String = Input::new()
                .with_prompt("店舗ID (番号で候補選択 / s:スキップ / Enter:ランダムID)")
                .allow_empty(true)
                .interact_text()
                .map_err(|e| SlipPdfError::CliExecution(e.to_string()))?;

            match parse_answer(&input, &self.candidates) {
                Some(decision) => return Ok(decision),
                None => warn!(input = %input, "ファイル名に使えない店舗IDです"),
            }
        }
    }
}

/// 入力を解釈（不正な店舗IDは None）
pub fn parse_answer(input: &str, candidates: &[String]) -> Option<Decision> {
    let trimmed = input.trim();

    match trimmed {
        "" => Some(Decision::Fallback),
        "s" | "S" => Some(Decision::Skip),
        _ => {
            if let Ok(n) = trimmed.parse::<usize>() {
                if (1..=candidates.len()).contains(&n) {
                    return Some(Decision::Use(candidates[n - 1].clone()));
                }
            }
            if is_valid_location_id(trimmed) {
                Some(Decision::Use(trimmed.to_string()))
            } else {
                None
            }
        }
    }
}
