//! 规则校验与计算
//!
//! 校验按固定顺序执行，第一个失败即返回，不做任何部分计算：
//! 1. 请求为空或规则列表为空
//! 2. 规则数量超限
//! 3. 除数重复
//! 4. 逐条规则（按输入顺序）检查除数、单词是否为空、单词长度
//! 5. 上界不为正数或超过配置上限

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::error::{EngineError, Result};
use crate::logger::{EngineLogger, TracingLogger};
use crate::models::{FizzBuzzRequest, ResultMap, Rule};

/// 单次请求允许的最大规则数
pub const MAX_RULES: usize = 100;

/// 单词最大长度（按字符计）
pub const MAX_WORD_LENGTH: usize = 1024;

/// 上界默认上限，防止单个请求占用过多 CPU 和内存
pub const DEFAULT_MAX_BOUND: i32 = 100_000;

/// 引擎限制参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineLimits {
    pub max_rules: usize,
    pub max_word_length: usize,
    pub max_bound: i32,
}

impl Default for EngineLimits {
    fn default() -> Self {
        Self {
            max_rules: MAX_RULES,
            max_word_length: MAX_WORD_LENGTH,
            max_bound: DEFAULT_MAX_BOUND,
        }
    }
}

impl EngineLimits {
    pub fn with_max_bound(mut self, max_bound: i32) -> Self {
        self.max_bound = max_bound;
        self
    }
}

/// FizzBuzz 规则引擎
///
/// 无内部可变状态，克隆成本为一次 Arc 引用计数。
#[derive(Clone)]
pub struct FizzBuzzEngine {
    limits: EngineLimits,
    logger: Arc<dyn EngineLogger>,
}

impl Default for FizzBuzzEngine {
    fn default() -> Self {
        Self::new(Arc::new(TracingLogger))
    }
}

impl std::fmt::Debug for FizzBuzzEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FizzBuzzEngine")
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

impl FizzBuzzEngine {
    pub fn new(logger: Arc<dyn EngineLogger>) -> Self {
        Self::with_limits(EngineLimits::default(), logger)
    }

    pub fn with_limits(limits: EngineLimits, logger: Arc<dyn EngineLogger>) -> Self {
        Self { limits, logger }
    }

    pub fn limits(&self) -> &EngineLimits {
        &self.limits
    }

    /// 校验请求并计算结果
    ///
    /// 校验失败时通过注入的日志能力记录一次，然后返回错误。
    pub fn process(&self, request: Option<&FizzBuzzRequest>) -> Result<ResultMap> {
        match self.validate(request) {
            Ok(request) => Ok(compute(&request.rules, request.bound)),
            Err(e) => {
                self.logger.validation_failed(&e);
                Err(e)
            }
        }
    }

    /// 仅执行校验，不记录日志
    pub fn validate<'a>(&self, request: Option<&'a FizzBuzzRequest>) -> Result<&'a FizzBuzzRequest> {
        let request = match request {
            Some(r) if !r.rules.is_empty() => r,
            _ => return Err(EngineError::EmptyRequest),
        };

        if request.rules.len() > self.limits.max_rules {
            return Err(EngineError::TooManyRules {
                count: request.rules.len(),
                max: self.limits.max_rules,
            });
        }

        let duplicates = find_duplicates(&request.rules);
        if !duplicates.is_empty() {
            return Err(EngineError::DuplicateDivisors(duplicates));
        }

        for rule in &request.rules {
            self.validate_rule(rule)?;
        }

        if request.bound <= 0 {
            return Err(EngineError::InvalidBound {
                bound: request.bound,
            });
        }

        if request.bound > self.limits.max_bound {
            return Err(EngineError::BoundTooLarge {
                bound: request.bound,
                max: self.limits.max_bound,
            });
        }

        Ok(request)
    }

    fn validate_rule(&self, rule: &Rule) -> Result<()> {
        if rule.divisor <= 0 {
            return Err(EngineError::InvalidDivisor {
                divisor: rule.divisor,
            });
        }

        let word = match rule.word.as_deref() {
            Some(w) if !w.trim().is_empty() => w,
            _ => {
                return Err(EngineError::WordRequired {
                    divisor: rule.divisor,
                });
            }
        };

        // 长度按 UTF-16 编码单元计算
        let length = word.encode_utf16().count();
        if length > self.limits.max_word_length {
            return Err(EngineError::WordTooLong {
                divisor: rule.divisor,
                length,
                max: self.limits.max_word_length,
            });
        }

        Ok(())
    }
}

/// 找出重复的除数
///
/// 每个重复值只出现一次，顺序为该除数在输入中首次出现的位置。
fn find_duplicates(rules: &[Rule]) -> Vec<i32> {
    let mut counts: HashMap<i32, usize> = HashMap::with_capacity(rules.len());
    for rule in rules {
        *counts.entry(rule.divisor).or_default() += 1;
    }

    let mut reported = HashSet::new();
    rules
        .iter()
        .map(|r| r.divisor)
        .filter(|d| counts[d] > 1 && reported.insert(*d))
        .collect()
}

/// 调用前必须保证所有除数大于 0
fn compute(rules: &[Rule], bound: i32) -> ResultMap {
    let mut result = ResultMap::new();

    for number in 1..=bound {
        let mut word = String::new();
        for rule in rules {
            if number % rule.divisor == 0 {
                word.push_str(rule.word_str());
            }
        }
        if !word.is_empty() {
            result.insert(number, word);
        }
    }

    result
}
