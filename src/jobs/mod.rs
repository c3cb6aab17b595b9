use redis::{aio::ConnectionManager, AsyncCommands};
use serde::{Deserialize, Serialize};

pub mod tasks;

/// Redis list the API pushes to and the worker pops from.
pub const JOB_QUEUE_KEY: &str = "tripforge:jobs";

/// Wall-clock limit for one job. There is no cancellation once a job has
/// started; this is the only time bound.
pub const TASK_TIME_LIMIT_SECS: u64 = 180;

/// Fixed number of jobs a worker process runs at once.
pub const WORKER_CONCURRENCY: usize = 4;

/// One background job. Each kind loads the trip, calls exactly one
/// AI-workflow function, and rewrites the child documents it owns.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "kind")]
pub enum TripJob {
    FetchDestinationInfo { trip_id: String },
    ProcessTouristPlaces { trip_id: String },
    GenerateItinerary { trip_id: String },
    FetchTravelOptions { trip_id: String },
}

impl TripJob {
    pub fn trip_id(&self) -> &str {
        match self {
            TripJob::FetchDestinationInfo { trip_id }
            | TripJob::ProcessTouristPlaces { trip_id }
            | TripJob::GenerateItinerary { trip_id }
            | TripJob::FetchTravelOptions { trip_id } => trip_id,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TripJob::FetchDestinationInfo { .. } => "fetch_destination_info",
            TripJob::ProcessTouristPlaces { .. } => "process_tourist_places",
            TripJob::GenerateItinerary { .. } => "generate_itinerary",
            TripJob::FetchTravelOptions { .. } => "fetch_travel_options",
        }
    }
}

/// Push a job onto the queue. Failures are logged and swallowed; trip
/// creation must not fail because the broker is down.
pub async fn enqueue(conn: &ConnectionManager, job: &TripJob) {
    let payload = match serde_json::to_string(job) {
        Ok(payload) => payload,
        Err(e) => {
            eprintln!("Failed to serialize job {}: {}", job.name(), e);
            return;
        }
    };

    let mut conn = conn.clone();
    match conn.lpush::<_, _, ()>(JOB_QUEUE_KEY, payload).await {
        Ok(_) => println!("Enqueued {} for trip {}", job.name(), job.trip_id()),
        Err(e) => eprintln!("Failed to enqueue {}: {}", job.name(), e),
    }
}

/// Everything a trip needs after creation. Pipeline order on the queue,
/// but the worker runs jobs concurrently with no ordering guarantee; the
/// itinerary task works with whatever places have landed by then.
pub async fn enqueue_trip_pipeline(conn: &ConnectionManager, trip_id: &str) {
    let trip_id = trip_id.to_string();
    enqueue(conn, &TripJob::FetchDestinationInfo { trip_id: trip_id.clone() }).await;
    enqueue(conn, &TripJob::ProcessTouristPlaces { trip_id: trip_id.clone() }).await;
    enqueue(conn, &TripJob::GenerateItinerary { trip_id: trip_id.clone() }).await;
    enqueue(conn, &TripJob::FetchTravelOptions { trip_id }).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_payload_carries_kind_tag() {
        let job = TripJob::GenerateItinerary {
            trip_id: "64f000000000000000000001".to_string(),
        };
        let payload = serde_json::to_string(&job).unwrap();
        assert!(payload.contains("\"kind\":\"GenerateItinerary\""));
        let back: TripJob = serde_json::from_str(&payload).unwrap();
        assert_eq!(back, job);
    }
}
