use rocket::{
    response::stream::{Event, EventStream},
    serde::json::Json,
    tokio::{select, sync::broadcast::error::RecvError},
    Route, Shutdown, State,
};

use crate::error::Result;
use crate::model::{api::candidate::CandidateSummary, store::Stores};
use crate::notifier::Notifier;
use crate::workflow::candidates;

pub fn routes() -> Vec<Route> {
    routes![index, events]
}

#[get("/")]
async fn index(stores: &State<Stores>) -> Result<Json<Vec<CandidateSummary>>> {
    let candidates = candidates::list_candidates(stores.candidates.as_ref()).await?;
    Ok(Json(candidates))
}

/// Live updates as server-sent events, named after each [`LiveEvent`].
/// Only events published after connecting are delivered.
///
/// [`LiveEvent`]: crate::model::api::event::LiveEvent
#[get("/events")]
fn events(notifier: &State<Notifier>, mut shutdown: Shutdown) -> EventStream![] {
    let mut rx = notifier.subscribe();
    info!("Live client connected ({} total)", notifier.subscriber_count());

    EventStream! {
        loop {
            let event = select! {
                received = rx.recv() => match received {
                    Ok(event) => event,
                    Err(RecvError::Closed) => break,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Live client fell behind, skipped {skipped} event(s)");
                        continue;
                    }
                },
                _ = &mut shutdown => break,
            };
            yield Event::json(&event).event(event.name());
        }
        debug!("Live client stream ended");
    }
}

#[cfg(test)]
mod tests {
    use rocket::{
        http::{ContentType, Status},
        local::asynchronous::Client,
    };

    use super::*;
    use crate::model::db::NewCandidate;

    #[backend_test]
    async fn index_is_public(client: Client, stores: Stores) {
        let response = client.get(uri!(index)).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        let listed: Vec<CandidateSummary> = response.into_json().await.unwrap();
        assert!(listed.is_empty());

        let candidate = stores
            .candidates
            .insert_candidate(NewCandidate::example())
            .await
            .unwrap();
        let response = client.get(uri!(index)).dispatch().await;
        let listed: Vec<CandidateSummary> = response.into_json().await.unwrap();
        assert_eq!(listed, vec![CandidateSummary::from(candidate)]);
    }

    #[backend_test]
    async fn events_is_a_stream(client: Client) {
        let response = client.get(uri!(events)).dispatch().await;

        assert_eq!(Status::Ok, response.status());
        assert_eq!(Some(ContentType::EventStream), response.content_type());
    }
}
