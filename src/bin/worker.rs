use std::sync::Arc;
use std::time::Duration;

use env_logger::Env;
use redis::AsyncCommands;
use tokio::sync::Semaphore;

use tripforge_api::db;
use tripforge_api::jobs::tasks::{run_job, WorkerContext};
use tripforge_api::jobs::{TripJob, JOB_QUEUE_KEY, TASK_TIME_LIMIT_SECS, WORKER_CONCURRENCY};
use tripforge_api::services::image_search_service::ImageSearchService;
use tripforge_api::services::llm_service::LlmClient;
use tripforge_api::services::place_service::PlaceScraper;
use tripforge_api::services::travel_api_service::TravelApiService;
use tripforge_api::services::weather_service::WeatherService;

#[tokio::main]
async fn main() {
    println!("Worker starting...");

    env_logger::init_from_env(Env::default().default_filter_or("info"));

    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    }

    let mongo_uri = std::env::var("MONGODB_URI").expect("MONGODB_URI must be set");
    let mongo = db::mongo::create_mongo_client(&mongo_uri).await;

    let redis_url = std::env::var("REDIS_URL").expect("REDIS_URL must be set");
    let redis_manager = db::redis::create_redis_manager(&redis_url).await;

    let llm = LlmClient::new().expect("LLM_API_KEY must be set");
    let travel_api = TravelApiService::new(redis_manager.clone());

    // Enrichment services are optional; a missing key just disables that
    // enrichment.
    let weather = match WeatherService::new() {
        Ok(service) => Some(service),
        Err(e) => {
            eprintln!("Weather disabled: {}", e);
            None
        }
    };
    let images = match ImageSearchService::new() {
        Ok(service) => Some(service),
        Err(e) => {
            eprintln!("Image search disabled: {}", e);
            None
        }
    };
    let scraper = match PlaceScraper::new() {
        Ok(scraper) => Some(scraper),
        Err(e) => {
            eprintln!("Place scraper disabled: {}", e);
            None
        }
    };

    let ctx = Arc::new(WorkerContext {
        mongo,
        llm,
        weather,
        images,
        scraper,
        travel_api,
    });

    let semaphore = Arc::new(Semaphore::new(WORKER_CONCURRENCY));
    let mut conn = redis_manager.clone();

    println!(
        "Worker ready, polling {} with concurrency {}",
        JOB_QUEUE_KEY, WORKER_CONCURRENCY
    );

    loop {
        // BRPOP with a finite timeout so a dead broker connection is retried
        // rather than blocked on forever.
        let popped: Option<(String, String)> =
            match conn.brpop(JOB_QUEUE_KEY, 5.0).await {
                Ok(popped) => popped,
                Err(e) => {
                    eprintln!("Queue poll failed: {}", e);
                    tokio::time::sleep(Duration::from_secs(1)).await;
                    continue;
                }
            };

        let payload = match popped {
            Some((_, payload)) => payload,
            None => continue,
        };

        let job: TripJob = match serde_json::from_str(&payload) {
            Ok(job) => job,
            Err(e) => {
                eprintln!("Dropping unparseable job payload: {}", e);
                continue;
            }
        };

        let permit = match semaphore.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => break, // semaphore closed, shutting down
        };
        let ctx = ctx.clone();

        tokio::spawn(async move {
            let _permit = permit;
            let limit = Duration::from_secs(TASK_TIME_LIMIT_SECS);
            if tokio::time::timeout(limit, run_job(&ctx, &job)).await.is_err() {
                eprintln!(
                    "Job {} for trip {} exceeded the {}s time limit",
                    job.name(),
                    job.trip_id(),
                    TASK_TIME_LIMIT_SECS
                );
            }
        });
    }
}
