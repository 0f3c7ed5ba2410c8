/// 等级
///
/// 分界线为闭区间下界，自上而下匹配，第一个满足的生效。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    #[serde(rename = "B+")]
    BPlus,
    B,
    C,
    D,
    F,
}

/// (下界, 等级)，按下界降序
const BOUNDARIES: [(u32, Grade); 6] = [
    (90, Grade::APlus),
    (80, Grade::A),
    (70, Grade::BPlus),
    (60, Grade::B),
    (50, Grade::C),
    (40, Grade::D),
];

impl Grade {
    /// 根据百分比计算等级
    pub fn from_percentage(percentage: u32) -> Self {
        BOUNDARIES
            .iter()
            .find(|(lower, _)| percentage >= *lower)
            .map(|(_, grade)| *grade)
            .unwrap_or(Grade::F)
    }

    /// 等级标签
    pub fn label(self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }

    /// 等级对应的评价
    pub fn status(self) -> &'static str {
        match self {
            Grade::APlus => "Outstanding",
            Grade::A => "Excellent",
            Grade::BPlus => "Very Good",
            Grade::B => "Good",
            Grade::C => "Average",
            Grade::D => "Below Average",
            Grade::F => "Needs Improvement",
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries_are_inclusive() {
        assert_eq!(Grade::from_percentage(100), Grade::APlus);
        assert_eq!(Grade::from_percentage(90), Grade::APlus);
        assert_eq!(Grade::from_percentage(89), Grade::A);
        assert_eq!(Grade::from_percentage(80), Grade::A);
        assert_eq!(Grade::from_percentage(79), Grade::BPlus);
        assert_eq!(Grade::from_percentage(70), Grade::BPlus);
        assert_eq!(Grade::from_percentage(60), Grade::B);
        assert_eq!(Grade::from_percentage(50), Grade::C);
        assert_eq!(Grade::from_percentage(40), Grade::D);
        assert_eq!(Grade::from_percentage(39), Grade::F);
        assert_eq!(Grade::from_percentage(0), Grade::F);
    }

    #[test]
    fn test_status_labels() {
        let expected = [
            (Grade::APlus, "A+", "Outstanding"),
            (Grade::A, "A", "Excellent"),
            (Grade::BPlus, "B+", "Very Good"),
            (Grade::B, "B", "Good"),
            (Grade::C, "C", "Average"),
            (Grade::D, "D", "Below Average"),
            (Grade::F, "F", "Needs Improvement"),
        ];
        for (grade, label, status) in expected {
            assert_eq!(grade.label(), label);
            assert_eq!(grade.status(), status);
        }
    }
}
