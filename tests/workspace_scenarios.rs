//! Workspace behavior driven through the public library API.

use copydesk::autosave::AutoSaveTimer;
use copydesk::catalog::{ContentType, ResearchType};
use copydesk::config::Config;
use copydesk::error::CopydeskError;
use copydesk::generation::{GenerationHandler, GenerationState, TemplateGenerator};
use copydesk::notice::Notice;
use copydesk::session::{ContentWorkspace, DeletePolicy, Rating, ResearchWorkspace};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[tokio::test(start_paused = true)]
async fn test_blog_post_generation_lands_in_history() {
    let config = Config::default();
    let handler = GenerationHandler::new(Arc::new(config.generator()));
    let mut ws = config.content_workspace();
    ws.new_session(ContentType::from_slug("blog-post"));
    ws.set_prompt("Write about coffee", Instant::now());

    let notice = handler.generate_content(&mut ws).await.unwrap();
    assert_eq!(notice.message, "Content generated successfully!");
    assert_eq!(handler.state(), GenerationState::Idle);
    assert!(!ws.draft().content.is_empty());

    let history = ws.history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].prompt, "Write about coffee");
    assert_eq!(history[0].settings.word_count, 1500);
}

#[tokio::test(start_paused = true)]
async fn test_timer_coalesces_edits_into_one_commit() {
    let ws = Arc::new(Mutex::new(ContentWorkspace::new(
        ms(2000),
        DeletePolicy::KeepLast,
    )));
    let mut timer = AutoSaveTimer::new();
    let start = Instant::now();

    ws.lock().await.set_prompt("Write about coffee", start);
    for (offset, body) in [(0, "v1"), (500, "v2"), (900, "v3")] {
        tokio::time::sleep_until(start + ms(offset)).await;
        ws.lock().await.set_content(body, Instant::now());
        timer.reschedule(Arc::clone(&ws), ms(2000));
    }

    tokio::time::sleep_until(start + ms(2899)).await;
    assert!(ws.lock().await.history().is_empty());

    let committed = timer.settle().await;
    assert!(committed.is_some());
    assert!(Instant::now() >= start + ms(2900));
    assert!(Instant::now() < start + ms(3000));

    let guard = ws.lock().await;
    let history = guard.history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].content, "v3");
}

#[test]
fn test_whitespace_drafts_never_commit() {
    let mut ws = ContentWorkspace::new(ms(2000), DeletePolicy::KeepLast);
    let start = Instant::now();
    for (prompt, body) in [("", "body"), ("prompt", " \n "), ("\t", "")] {
        ws.set_prompt(prompt, start);
        ws.set_content(body, start);
        assert!(ws.tick(start + ms(2000)).is_none());
    }
    assert!(ws.store().is_empty());
}

#[tokio::test]
async fn test_research_delete_non_active_thread() {
    let handler = GenerationHandler::new(Arc::new(TemplateGenerator::instant()));
    let mut ws = ResearchWorkspace::new(DeletePolicy::KeepLast);

    handler.ask(&mut ws, "Who buys cold brew?").await.unwrap();
    let older = ws.active_id().unwrap().to_string();
    ws.new_session(ResearchType::TrendAnalysis);
    handler.ask(&mut ws, "Is oat milk still growing?").await.unwrap();
    let active = ws.active_id().unwrap().to_string();
    assert_eq!(ws.history().len(), 2);

    ws.delete(&older).unwrap();
    assert_eq!(ws.history().len(), 1);
    assert_eq!(ws.active_id(), Some(active.as_str()));
}

#[tokio::test]
async fn test_deleting_only_session_is_reported() {
    let handler = GenerationHandler::new(Arc::new(TemplateGenerator::instant()));
    let mut ws = ResearchWorkspace::new(DeletePolicy::KeepLast);
    handler.ask(&mut ws, "Only question").await.unwrap();
    let id = ws.active_id().unwrap().to_string();

    let err = ws.delete(&id).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CopydeskError>(),
        Some(CopydeskError::LastSession)
    ));
    assert!(Notice::from_error(&err).is_error());
    assert_eq!(ws.history().len(), 1);
}

#[tokio::test]
async fn test_rating_last_write_wins() {
    let handler = GenerationHandler::new(Arc::new(TemplateGenerator::instant()));
    let mut ws = ResearchWorkspace::new(DeletePolicy::KeepLast);
    handler.ask(&mut ws, "Rate this").await.unwrap();
    let reply = ws.messages()[1].clone();

    ws.rate_message(&reply.id, Rating::Up).unwrap();
    ws.rate_message(&reply.id, Rating::Down).unwrap();

    let stored = &ws.history()[0].messages[1];
    assert_eq!(stored.rating, Some(Rating::Down));
    assert_eq!(stored.content, reply.content);
    assert_eq!(stored.timestamp, reply.timestamp);
}

#[tokio::test]
async fn test_allow_delete_last_config_empties_store() {
    let mut config = Config::default();
    config.sessions.allow_delete_last = true;
    let mut ws = config.research_workspace();
    let handler = GenerationHandler::new(Arc::new(TemplateGenerator::instant()));
    handler.ask(&mut ws, "Temporary").await.unwrap();
    let id = ws.active_id().unwrap().to_string();

    ws.delete(&id).unwrap();
    assert!(ws.history().is_empty());
    assert!(ws.messages().is_empty());
    assert!(ws.active_id().is_none());
}
