//! Skirmish: a runnable Warboard demo server.
//!
//! Seeds an in-memory store with two users and one session on a small
//! arena map, then serves the session protocol on port 9090. Connect a
//! WebSocket client and send:
//!
//! ```json
//! {"type":"session:join","userId":1,"sessionId":1}
//! {"type":"character:new","name":"Brynn","row":12,"col":8}
//! ```

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use warboard::prelude::*;

/// A 24x24 arena: a short wall down the middle and a pair of lava tiles
/// that cost 20 health to cross.
fn build_map() -> GridMap {
    let mut map = GridMap::new(MapId(1), 24, 24);
    for row in 8..12 {
        map = map.with_obstacle(row, 6);
    }
    map.with_hazard(12, 12, 20).with_hazard(12, 13, 20)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let store = Arc::new(MemoryStore::new());
    let alice = store.add_user("alice")?;
    let bob = store.add_user("bob")?;
    let started_at = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
    let session = store.add_session(MapId(1), started_at).await?;

    tracing::info!(
        session_id = %session.id,
        users = ?[&alice.name, &bob.name],
        "seeded demo session"
    );

    let server = WarboardServerBuilder::new()
        .bind("0.0.0.0:9090")
        .build(store, Arc::new(build_map()))
        .await?;

    server.run().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::{SinkExt, StreamExt};
    use serde_json::{Value, json};
    use std::time::Duration;
    use tokio_tungstenite::tungstenite::Message;

    type Ws = tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >;

    async fn start() -> (String, SessionId) {
        let store = Arc::new(MemoryStore::new());
        store.add_user("alice").unwrap();
        store.add_user("bob").unwrap();
        let session = store.add_session(MapId(1), 1_700_000_000).await.unwrap();
        let server = WarboardServerBuilder::new()
            .bind("127.0.0.1:0")
            .build(store, Arc::new(build_map()))
            .await
            .unwrap();
        let addr = server.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            let _ = server.run().await;
        });
        (addr, session.id)
    }

    async fn ws(addr: &str) -> Ws {
        let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
            .await
            .unwrap();
        ws
    }

    async fn send(ws: &mut Ws, value: Value) {
        ws.send(Message::Text(value.to_string().into())).await.unwrap();
    }

    async fn recv_type(ws: &mut Ws, ty: &str) -> Value {
        loop {
            let msg = tokio::time::timeout(Duration::from_secs(5), ws.next())
                .await
                .expect("timeout")
                .unwrap()
                .unwrap();
            if let Message::Text(text) = msg {
                let value: Value = serde_json::from_str(&text).unwrap();
                if value["type"] == ty {
                    return value;
                }
            }
        }
    }

    async fn join(ws: &mut Ws, user: u64, session: SessionId) -> Value {
        send(ws, json!({"type":"session:join","userId":user,"sessionId":session.0})).await;
        recv_type(ws, "session:snapshot").await
    }

    async fn create(ws: &mut Ws, row: u32, col: u32) -> u64 {
        send(ws, json!({"type":"character:new","row":row,"col":col})).await;
        loop {
            let event = recv_type(ws, "character:new").await;
            if event["own"] == true {
                return event["character"]["id"].as_u64().unwrap();
            }
        }
    }

    #[tokio::test]
    async fn test_two_player_ranged_skirmish() {
        let (addr, session) = start().await;
        let mut alice = ws(&addr).await;
        let mut bob = ws(&addr).await;
        assert_eq!(join(&mut alice, 1, session).await["turn"], 1);
        join(&mut bob, 2, session).await;

        let archer = create(&mut alice, 2, 2).await;
        let target = create(&mut bob, 2, 5).await;

        // Distance 3, default ranged range 4: the shot lands for 20.
        send(
            &mut alice,
            json!({"type":"character:attack","id":archer,
                   "opponentId":target,"attackType":"ranged"}),
        )
        .await;
        let attack = recv_type(&mut bob, "character:attack").await;
        assert_eq!(attack["damage"], 20);
        assert_eq!(attack["opponent"]["defeated"], false);
        assert_eq!(recv_type(&mut bob, "turn:change").await["userId"], 2);

        // Bob answers with magic: same damage, costs 10 mana.
        send(
            &mut bob,
            json!({"type":"character:attack","id":target,
                   "opponentId":archer,"attackType":"magic"}),
        )
        .await;
        let attack = recv_type(&mut alice, "character:attack").await;
        assert_eq!(attack["damage"], 20);
        let mana = attack["attacker"]["properties"]
            .as_array()
            .unwrap()
            .iter()
            .find(|p| p["name"] == "mana")
            .unwrap()["value"]
            .as_u64()
            .unwrap();
        assert_eq!(mana, 90);
    }

    #[tokio::test]
    async fn test_wall_blocks_movement() {
        let (addr, session) = start().await;
        let mut alice = ws(&addr).await;
        join(&mut alice, 1, session).await;
        let id = create(&mut alice, 9, 5).await;

        // (9,6) is part of the mid-board wall.
        send(&mut alice, json!({"type":"character:move","id":id,"row":9,"col":6})).await;
        let err = recv_type(&mut alice, "error").await;
        assert_eq!(err["reason"], "tile_obstacle");
    }

    #[tokio::test]
    async fn test_lava_costs_health_to_cross() {
        let (addr, session) = start().await;
        let mut alice = ws(&addr).await;
        join(&mut alice, 1, session).await;
        let id = create(&mut alice, 12, 10).await;

        send(&mut alice, json!({"type":"character:move","id":id,"row":12,"col":12})).await;
        let moved = recv_type(&mut alice, "character:move").await;
        let health = moved["character"]["properties"]
            .as_array()
            .unwrap()
            .iter()
            .find(|p| p["name"] == "health")
            .unwrap()["value"]
            .as_u64()
            .unwrap();
        assert_eq!(health, 80, "lava tile costs 20 on entry");
    }
}
