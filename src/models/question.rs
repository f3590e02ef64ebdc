use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::error::{AppResult, StoreError};
use crate::scoring::CodePair;

/// 题目（参考答案）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: Uuid,
    /// 轮次编号
    pub roundno: u32,
    #[serde(default)]
    pub title: String,
    pub htmlcode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csscode: Option<String>,
}

impl Question {
    /// 参考答案代码
    pub fn reference(&self) -> CodePair<'_> {
        CodePair::new(&self.htmlcode, self.csscode.as_deref())
    }
}

/// 题目引用：按 ID 或按轮次查找
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestionRef {
    ById(Uuid),
    ByRound(u32),
}

impl fmt::Display for QuestionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionRef::ById(id) => write!(f, "题目 {}", id),
            QuestionRef::ByRound(round) => write!(f, "第 {} 轮", round),
        }
    }
}

impl FromStr for QuestionRef {
    type Err = uuid::Error;

    /// 纯数字视为轮次，其余按 UUID 解析
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(round) = s.parse::<u32>() {
            return Ok(QuestionRef::ByRound(round));
        }
        Uuid::parse_str(s).map(QuestionRef::ById)
    }
}

impl Serialize for QuestionRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            QuestionRef::ById(id) => serializer.serialize_str(&id.to_string()),
            QuestionRef::ByRound(round) => serializer.serialize_u32(*round),
        }
    }
}

// 既接受整数轮次，也接受 UUID 字符串（或数字字符串）
impl<'de> Deserialize<'de> for QuestionRef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct QuestionRefVisitor;

        impl<'de> Visitor<'de> for QuestionRefVisitor {
            type Value = QuestionRef;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a round number or a question UUID")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                value.parse().map_err(E::custom)
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                u32::try_from(value)
                    .map(QuestionRef::ByRound)
                    .map_err(|_| E::custom(format!("invalid round number: {}", value)))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                u32::try_from(value)
                    .map(QuestionRef::ByRound)
                    .map_err(|_| E::custom(format!("invalid round number: {}", value)))
            }
        }

        deserializer.deserialize_any(QuestionRefVisitor)
    }
}

/// 题库
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    /// 创建题库，按轮次升序排列；ID 或轮次重复时报错
    pub fn new(mut questions: Vec<Question>) -> AppResult<Self> {
        let mut ids = HashSet::new();
        let mut rounds = HashSet::new();
        for q in &questions {
            if !ids.insert(q.id) {
                return Err(StoreError::DuplicateQuestion {
                    what: "id",
                    value: q.id.to_string(),
                }
                .into());
            }
            if !rounds.insert(q.roundno) {
                return Err(StoreError::DuplicateQuestion {
                    what: "roundno",
                    value: q.roundno.to_string(),
                }
                .into());
            }
        }
        questions.sort_by_key(|q| q.roundno);
        Ok(Self { questions })
    }

    /// 根据引用查找题目
    pub fn resolve(&self, question: &QuestionRef) -> Option<&Question> {
        match question {
            QuestionRef::ById(id) => self.questions.iter().find(|q| q.id == *id),
            QuestionRef::ByRound(round) => self.questions.iter().find(|q| q.roundno == *round),
        }
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(round: u32) -> Question {
        Question {
            id: Uuid::new_v4(),
            roundno: round,
            title: format!("Round {}", round),
            htmlcode: "<p>x</p>".to_string(),
            csscode: None,
        }
    }

    #[derive(Debug, Deserialize)]
    struct Holder {
        question: QuestionRef,
    }

    #[test]
    fn test_question_ref_from_toml_integer_and_strings() {
        let h: Holder = toml::from_str("question = 4").unwrap();
        assert_eq!(h.question, QuestionRef::ByRound(4));

        let h: Holder = toml::from_str("question = \"7\"").unwrap();
        assert_eq!(h.question, QuestionRef::ByRound(7));

        let id = Uuid::new_v4();
        let h: Holder = toml::from_str(&format!("question = \"{}\"", id)).unwrap();
        assert_eq!(h.question, QuestionRef::ById(id));

        assert!(toml::from_str::<Holder>("question = -1").is_err());
        assert!(toml::from_str::<Holder>("question = \"round-one\"").is_err());
    }

    #[test]
    fn test_question_ref_json_round_trip_shape() {
        assert_eq!(serde_json::to_string(&QuestionRef::ByRound(2)).unwrap(), "2");
        let id = Uuid::nil();
        assert_eq!(
            serde_json::to_string(&QuestionRef::ById(id)).unwrap(),
            format!("\"{}\"", id)
        );
    }

    #[test]
    fn test_bank_resolves_by_id_and_round() {
        let q1 = question(2);
        let q2 = question(1);
        let id = q1.id;
        let bank = QuestionBank::new(vec![q1, q2]).unwrap();

        assert_eq!(bank.questions()[0].roundno, 1);
        assert_eq!(bank.resolve(&QuestionRef::ById(id)).map(|q| q.roundno), Some(2));
        assert_eq!(bank.resolve(&QuestionRef::ByRound(1)).map(|q| q.roundno), Some(1));
        assert!(bank.resolve(&QuestionRef::ByRound(9)).is_none());
        assert!(bank.resolve(&QuestionRef::ById(Uuid::new_v4())).is_none());
    }

    #[test]
    fn test_bank_rejects_duplicate_rounds() {
        let err = QuestionBank::new(vec![question(1), question(1)]).unwrap_err();
        assert!(err.to_string().contains("roundno"));
    }

    #[test]
    fn test_reference_treats_missing_css_as_empty() {
        let q = question(1);
        let pair = q.reference();
        assert_eq!(pair.html, "<p>x</p>");
        assert_eq!(pair.css, "");
    }
}
