/// Database models for EduAgent
///
/// # Models
///
/// - `user`: Accounts, learning preferences and gamification stats
/// - `roadmap`: Generated curricula with phases, modules and progress
/// - `post`: Community channel posts and likes
///
/// # Example
///
/// ```no_run
/// use eduagent_shared::db::pool::{create_pool, DatabaseConfig};
/// use eduagent_shared::models::roadmap::Roadmap;
/// use uuid::Uuid;
///
/// # async fn example(user_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// for roadmap in Roadmap::list_by_user(&pool, user_id).await? {
///     let (done, total) = roadmap.progress();
///     println!("{}: {done}/{total}", roadmap.title);
/// }
/// # Ok(())
/// # }
/// ```

pub mod post;
pub mod roadmap;
pub mod user;
