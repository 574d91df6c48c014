//! 规则引擎领域模型
//!
//! JSON 字段名沿用线上协议（`multiples` / `multiple` / `wordToPrint` / `maxNumber`），
//! 同时接受首字母大写的写法，Rust 侧使用领域命名。
//! 除数和上界为 32 位整数，超出范围的 JSON 数字在反序列化时拒绝。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 未提供 `maxNumber` 时的默认上界
pub const DEFAULT_BOUND: i32 = 100;

fn default_bound() -> i32 {
    DEFAULT_BOUND
}

/// 单条规则：能被 `divisor` 整除的数字追加 `word`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// 除数；缺省反序列化为 0，由校验拒绝
    #[serde(rename = "multiple", alias = "Multiple", default)]
    pub divisor: i32,
    /// 追加的单词；缺省或 null 时为 None
    #[serde(rename = "wordToPrint", alias = "WordToPrint", default)]
    pub word: Option<String>,
}

impl Rule {
    pub fn new(divisor: i32, word: impl Into<String>) -> Self {
        Self {
            divisor,
            word: Some(word.into()),
        }
    }

    /// 校验通过后使用，未设置单词时按空串处理
    pub fn word_str(&self) -> &str {
        self.word.as_deref().unwrap_or_default()
    }
}

/// 计算请求
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FizzBuzzRequest {
    #[serde(rename = "multiples", alias = "Multiples", default)]
    pub rules: Vec<Rule>,
    #[serde(rename = "maxNumber", alias = "MaxNumber", default = "default_bound")]
    pub bound: i32,
}

impl FizzBuzzRequest {
    pub fn new(rules: Vec<Rule>, bound: i32) -> Self {
        Self { rules, bound }
    }
}

impl Default for FizzBuzzRequest {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            bound: DEFAULT_BOUND,
        }
    }
}

/// 计算结果：数字 -> 拼接后的单词
///
/// 只包含至少命中一条规则的数字，按数字升序序列化为 JSON 对象
/// （键为数字的字符串形式）。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultMap(BTreeMap<i32, String>);

impl ResultMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, number: i32, word: String) {
        self.0.insert(number, word);
    }

    pub fn get(&self, number: i32) -> Option<&str> {
        self.0.get(&number).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 按数字升序遍历
    pub fn iter(&self) -> impl Iterator<Item = (i32, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = i32> + '_ {
        self.0.keys().copied()
    }
}

impl FromIterator<(i32, String)> for ResultMap {
    fn from_iter<I: IntoIterator<Item = (i32, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
