#![allow(
    clippy::unwrap_used,
    clippy::panic,
    clippy::todo,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    missing_debug_implementations,
    clippy::clone_on_ref_ptr,
    clippy::items_after_statements,
    unreachable_pub,
    clippy::print_stdout,
    clippy::similar_names
)]
use reqwest::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

mod common;

async fn delete_message(app: &common::TestApp, chat_id: Uuid, message_id: &Value, user_id: Uuid) -> reqwest::Response {
    app.client
        .delete(app.api(&format!("/chats/{chat_id}/messages/{}", message_id.as_str().unwrap())))
        .json(&json!({ "userId": user_id }))
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_send_text_updates_summary() {
    let app = common::TestApp::spawn().await;
    let alice = app.register_user("alice").await;
    let bob = app.register_user("bob").await;
    let chat_id = app.open_chat(alice.id, bob.id).await;

    let message = app.send_text(chat_id, alice.id, "hello bob").await;
    assert_eq!(message["content"], "hello bob");
    assert_eq!(message["messageType"], "text");
    assert_eq!(message["chat"], chat_id.to_string().as_str());
    assert_eq!(message["sender"]["id"], alice.id.to_string().as_str());

    let chat = app.fetch_chat(chat_id).await;
    assert_eq!(chat["lastMessage"], "hello bob");
    assert_eq!(chat["lastMessageTime"], message["timestamp"]);
}

#[tokio::test]
async fn test_send_media_uses_placeholder_summary() {
    let app = common::TestApp::spawn().await;
    let alice = app.register_user("alice").await;
    let bob = app.register_user("bob").await;
    let chat_id = app.open_chat(alice.id, bob.id).await;

    let resp = app
        .client
        .post(app.api(&format!("/chats/{chat_id}/messages")))
        .json(&json!({
            "senderId": alice.id,
            "messageType": "image",
            "fileUrl": "/uploads/1_abc.webp",
            "fileName": "cat.jpg",
            "fileSize": 1234,
            "mimeType": "image/webp"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"]["fileUrl"], "/uploads/1_abc.webp");

    let chat = app.fetch_chat(chat_id).await;
    assert_eq!(chat["lastMessage"], "📷 Image");
}

#[tokio::test]
async fn test_send_rejects_invalid_payloads() {
    let app = common::TestApp::spawn().await;
    let alice = app.register_user("alice").await;
    let bob = app.register_user("bob").await;
    let chat_id = app.open_chat(alice.id, bob.id).await;
    let url = app.api(&format!("/chats/{chat_id}/messages"));

    // Blank text.
    let resp = app.client.post(&url).json(&json!({ "senderId": alice.id, "content": "   " })).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Media without a file.
    let resp =
        app.client.post(&url).json(&json!({ "senderId": alice.id, "messageType": "video" })).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Missing sender.
    let resp = app.client.post(&url).json(&json!({ "content": "hi" })).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Sender ID is required");

    // Nothing was stored.
    let chat = app.fetch_chat(chat_id).await;
    assert!(chat["messages"].as_array().unwrap().is_empty());
    assert!(chat["lastMessage"].is_null());
}

#[tokio::test]
async fn test_send_to_foreign_or_missing_chat() {
    let app = common::TestApp::spawn().await;
    let alice = app.register_user("alice").await;
    let bob = app.register_user("bob").await;
    let mallory = app.register_user("mallory").await;
    let chat_id = app.open_chat(alice.id, bob.id).await;

    let resp = app
        .client
        .post(app.api(&format!("/chats/{chat_id}/messages")))
        .json(&json!({ "senderId": mallory.id, "content": "let me in" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = app
        .client
        .post(app.api(&format!("/chats/{}/messages", Uuid::new_v4())))
        .json(&json!({ "senderId": alice.id, "content": "anyone?" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_only_message_clears_summary() {
    let app = common::TestApp::spawn().await;
    let alice = app.register_user("alice").await;
    let bob = app.register_user("bob").await;
    let chat_id = app.open_chat(alice.id, bob.id).await;

    let message = app.send_text(chat_id, alice.id, "oops").await;
    let resp = delete_message(&app, chat_id, &message["id"], alice.id).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);

    let chat = app.fetch_chat(chat_id).await;
    assert!(chat["messages"].as_array().unwrap().is_empty());
    assert!(chat["lastMessage"].is_null());
    assert!(chat["lastMessageTime"].is_null());
}

#[tokio::test]
async fn test_delete_keeps_summary_on_latest_message() {
    let app = common::TestApp::spawn().await;
    let alice = app.register_user("alice").await;
    let bob = app.register_user("bob").await;
    let chat_id = app.open_chat(alice.id, bob.id).await;

    let first = app.send_text(chat_id, alice.id, "one").await;
    let second = app.send_text(chat_id, bob.id, "two").await;
    let third = app.send_text(chat_id, alice.id, "three").await;

    // Deleting from the middle leaves the summary alone.
    let resp = delete_message(&app, chat_id, &second["id"], bob.id).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let chat = app.fetch_chat(chat_id).await;
    assert_eq!(chat["lastMessage"], "three");
    assert_eq!(chat["messages"].as_array().unwrap().len(), 2);

    // Deleting the tail moves the summary back to the new tail.
    let resp = delete_message(&app, chat_id, &third["id"], alice.id).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let chat = app.fetch_chat(chat_id).await;
    assert_eq!(chat["lastMessage"], "one");
    assert_eq!(chat["lastMessageTime"], first["timestamp"]);
}

#[tokio::test]
async fn test_delete_permissions() {
    let app = common::TestApp::spawn().await;
    let alice = app.register_user("alice").await;
    let bob = app.register_user("bob").await;
    let mallory = app.register_user("mallory").await;
    let chat_id = app.open_chat(alice.id, bob.id).await;

    let message = app.send_text(chat_id, alice.id, "hello").await;

    let resp = delete_message(&app, chat_id, &message["id"], mallory.id).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // The other participant may delete it.
    let resp = delete_message(&app, chat_id, &message["id"], bob.id).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // Already gone.
    let resp = delete_message(&app, chat_id, &message["id"], alice.id).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_message_from_another_chat_is_not_found() {
    let app = common::TestApp::spawn().await;
    let alice = app.register_user("alice").await;
    let bob = app.register_user("bob").await;
    let carol = app.register_user("carol").await;
    let with_bob = app.open_chat(alice.id, bob.id).await;
    let with_carol = app.open_chat(alice.id, carol.id).await;

    let message = app.send_text(with_bob, alice.id, "for bob").await;
    let resp = delete_message(&app, with_carol, &message["id"], alice.id).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let chat = app.fetch_chat(with_bob).await;
    assert_eq!(chat["messages"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_delete_removes_uploaded_file() {
    let app = common::TestApp::spawn().await;
    let alice = app.register_user("alice").await;
    let bob = app.register_user("bob").await;
    let chat_id = app.open_chat(alice.id, bob.id).await;

    let name = "1700000000000_abcdefghijkl.mp4";
    std::fs::write(app.upload_dir.path().join(name), b"video").unwrap();

    let resp = app
        .client
        .post(app.api(&format!("/chats/{chat_id}/messages")))
        .json(&json!({
            "senderId": alice.id,
            "messageType": "video",
            "fileUrl": format!("/uploads/{name}"),
            "mimeType": "video/mp4"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.unwrap();

    let resp = delete_message(&app, chat_id, &body["message"]["id"], alice.id).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(!app.upload_dir.path().join(name).exists());
}

#[tokio::test]
async fn test_forwarded_media_file_survives_until_last_reference() {
    let app = common::TestApp::spawn().await;
    let alice = app.register_user("alice").await;
    let bob = app.register_user("bob").await;
    let carol = app.register_user("carol").await;
    let with_alice = app.open_chat(alice.id, bob.id).await;
    let with_carol = app.open_chat(bob.id, carol.id).await;

    let name = "1700000000000_sharedvideo1.mp4";
    let file_url = format!("/uploads/{name}");
    std::fs::write(app.upload_dir.path().join(name), b"video").unwrap();

    let mut ids = Vec::new();
    for (chat_id, sender) in [(with_alice, alice.id), (with_carol, bob.id)] {
        let resp = app
            .client
            .post(app.api(&format!("/chats/{chat_id}/messages")))
            .json(&json!({ "senderId": sender, "messageType": "video", "fileUrl": file_url, "mimeType": "video/mp4" }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = resp.json().await.unwrap();
        ids.push(body["message"]["id"].clone());
    }

    // Bob deletes the forwarded copy; Alice's original still needs the file.
    let resp = delete_message(&app, with_carol, &ids[1], bob.id).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(app.upload_dir.path().join(name).exists());
    let chat = app.fetch_chat(with_alice).await;
    assert_eq!(chat["messages"][0]["fileUrl"], file_url.as_str());

    // Removing the last reference removes the file.
    let resp = delete_message(&app, with_alice, &ids[0], alice.id).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(!app.upload_dir.path().join(name).exists());
}
