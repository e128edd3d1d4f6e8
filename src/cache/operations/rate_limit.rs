use redis::aio::MultiplexedConnection;

/// 速率限制缓存操作
///
/// 每个 key 是一个有序集合，score 为请求时间戳。
pub struct RateLimitCacheOperations;

impl RateLimitCacheOperations {
    /// 清理窗口外的记录并返回窗口内的时间戳
    pub async fn prune_and_fetch(
        conn: &mut MultiplexedConnection,
        key: &str,
        cutoff: f64,
    ) -> Result<Vec<f64>, redis::RedisError> {
        // 开区间 "(cutoff" 表示只取严格大于 cutoff 的记录
        let (entries,): (Vec<(String, f64)>,) = redis::pipe()
            .atomic()
            .zrembyscore(key, "-inf", cutoff)
            .ignore()
            .zrangebyscore_withscores(key, format!("({}", cutoff), "+inf")
            .query_async(conn)
            .await?;

        Ok(entries.into_iter().map(|(_, score)| score).collect())
    }

    /// 记录一次请求并刷新过期时间
    pub async fn record(
        conn: &mut MultiplexedConnection,
        key: &str,
        timestamp: f64,
        ttl: u64,
    ) -> Result<(), redis::RedisError> {
        // 成员带上随机后缀，同一时刻的两个请求不会合并成一条
        let member = format!("{}-{}", timestamp, uuid::Uuid::new_v4());

        let _: () = redis::pipe()
            .atomic()
            .zadd(key, member, timestamp)
            .ignore()
            .expire(key, ttl as i64)
            .ignore()
            .query_async(conn)
            .await?;

        Ok(())
    }
}
