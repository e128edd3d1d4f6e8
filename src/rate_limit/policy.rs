use std::collections::HashMap;

/// 未认证调用者
pub const UNAUTHENTICATED: &str = "unauthenticated";
/// 已认证用户
pub const AUTHENTICATED: &str = "authenticated";
/// 高级用户
pub const PREMIUM: &str = "premium";

/// 单个等级的限流策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub limit: u32,
    pub window_secs: u64,
}

impl RateLimitPolicy {
    /// limit 与 window 必须都为正数
    pub fn new(limit: u32, window_secs: u64) -> Option<Self> {
        (limit > 0 && window_secs > 0).then_some(Self { limit, window_secs })
    }

    fn per_second(&self) -> f64 {
        self.limit as f64 / self.window_secs as f64
    }
}

/// 等级 -> 限流策略 的静态表
///
/// 未知等级不会报错，而是落到最严格的策略上。
#[derive(Debug, Clone)]
pub struct PolicyTable {
    policies: HashMap<String, RateLimitPolicy>,
    default_tier: String,
}

impl PolicyTable {
    /// 表不能为空；默认等级取速率最低的那个，速率相同时取 limit 更小的
    pub fn new(policies: HashMap<String, RateLimitPolicy>) -> Option<Self> {
        let default_tier = policies
            .iter()
            .min_by(|(_, a), (_, b)| {
                a.per_second()
                    .total_cmp(&b.per_second())
                    .then(a.limit.cmp(&b.limit))
            })
            .map(|(tier, _)| tier.clone())?;

        Some(Self {
            policies,
            default_tier,
        })
    }

    pub fn lookup(&self, tier: &str) -> RateLimitPolicy {
        self.policies
            .get(tier)
            .or_else(|| self.policies.get(&self.default_tier))
            .copied()
            .unwrap_or(DEFAULT_POLICY)
    }

    pub fn default_tier(&self) -> &str {
        &self.default_tier
    }
}

// 只在表被构造成空时才会用到，new() 已经排除了这种情况
const DEFAULT_POLICY: RateLimitPolicy = RateLimitPolicy {
    limit: 20,
    window_secs: 60,
};

impl Default for PolicyTable {
    fn default() -> Self {
        let policies = HashMap::from([
            (
                UNAUTHENTICATED.to_string(),
                RateLimitPolicy {
                    limit: 20,
                    window_secs: 60,
                },
            ),
            (
                AUTHENTICATED.to_string(),
                RateLimitPolicy {
                    limit: 100,
                    window_secs: 60,
                },
            ),
            (
                PREMIUM.to_string(),
                RateLimitPolicy {
                    limit: 500,
                    window_secs: 60,
                },
            ),
        ]);

        Self {
            policies,
            default_tier: UNAUTHENTICATED.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_tiers_resolve_to_their_policy() {
        let table = PolicyTable::default();
        assert_eq!(table.lookup(UNAUTHENTICATED).limit, 20);
        assert_eq!(table.lookup(AUTHENTICATED).limit, 100);
        assert_eq!(table.lookup(PREMIUM).limit, 500);
        assert_eq!(table.lookup(PREMIUM).window_secs, 60);
    }

    #[test]
    fn unknown_tier_falls_back_to_default() {
        let table = PolicyTable::default();
        assert_eq!(table.lookup("enterprise"), table.lookup(UNAUTHENTICATED));
        assert_eq!(table.lookup(""), table.lookup(UNAUTHENTICATED));
    }

    #[test]
    fn default_tier_is_most_restrictive() {
        let table = PolicyTable::new(HashMap::from([
            ("burst".to_string(), RateLimitPolicy::new(50, 10).unwrap()),
            ("slow".to_string(), RateLimitPolicy::new(100, 3600).unwrap()),
            ("normal".to_string(), RateLimitPolicy::new(30, 60).unwrap()),
        ]))
        .unwrap();

        assert_eq!(table.default_tier(), "slow");
        assert_eq!(table.lookup("missing").window_secs, 3600);
    }

    #[test]
    fn empty_table_or_zero_values_are_rejected() {
        assert!(PolicyTable::new(HashMap::new()).is_none());
        assert!(RateLimitPolicy::new(0, 60).is_none());
        assert!(RateLimitPolicy::new(10, 0).is_none());
    }
}
