use super::*;

// ============================================================
// VERSIONED ITEM TESTS
// ============================================================

#[test]
fn test_versioned_item_equality() {
    let a = VersionedItem::new("alpha", 1);
    let b = VersionedItem::new("alpha", 1);
    let c = VersionedItem::new("alpha", 2);

    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn test_versioned_item_json_round_trip() {
    let item = VersionedItem::new("payload", 7);

    let json = serde_json::to_string(&item).expect("serialization failed");
    let restored: VersionedItem = serde_json::from_str(&json).expect("deserialization failed");

    assert_eq!(restored, item);
}

// ============================================================
// PEER MESSAGE WIRE TESTS (bincode, as framed by the TCP bridge)
// ============================================================

#[test]
fn test_nodes_list_serialization() {
    let mut nodes = BTreeMap::new();
    nodes.insert(10u64, Address::new("127.0.0.1:7000"));
    nodes.insert(20u64, Address::new("127.0.0.1:7001"));

    let msg = PeerMessage::NodesList { sender: 10, nodes };

    let encoded = bincode::serialize(&msg).expect("failed to serialize NodesList");
    let decoded: PeerMessage =
        bincode::deserialize(&encoded).expect("failed to deserialize NodesList");

    if let PeerMessage::NodesList { sender, nodes } = decoded {
        assert_eq!(sender, 10);
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes.get(&20), Some(&Address::new("127.0.0.1:7001")));
    } else {
        panic!("wrong message type");
    }
}

#[test]
fn test_read_response_with_empty_vote() {
    let msg = PeerMessage::ReadResponse {
        sender: 30,
        request_id: 4,
        key: 42,
        item: None,
    };

    let encoded = bincode::serialize(&msg).expect("failed to serialize ReadResponse");
    let decoded: PeerMessage =
        bincode::deserialize(&encoded).expect("failed to deserialize ReadResponse");

    if let PeerMessage::ReadResponse {
        sender,
        request_id,
        key,
        item,
    } = decoded
    {
        assert_eq!(sender, 30);
        assert_eq!(request_id, 4);
        assert_eq!(key, 42);
        assert!(item.is_none(), "empty vote must survive the wire");
    } else {
        panic!("wrong message type");
    }
}

#[test]
fn test_join_data_serialization() {
    let mut records = Records::new();
    records.insert(5, VersionedItem::new("five", 2));
    records.insert(15, VersionedItem::new("fifteen", 1));

    let msg = PeerMessage::JoinData {
        sender: 20,
        records,
    };

    let encoded = bincode::serialize(&msg).expect("failed to serialize JoinData");
    let decoded: PeerMessage =
        bincode::deserialize(&encoded).expect("failed to deserialize JoinData");

    if let PeerMessage::JoinData { sender, records } = decoded {
        assert_eq!(sender, 20);
        assert_eq!(records.len(), 2);
        assert_eq!(records.get(&5), Some(&VersionedItem::new("five", 2)));
    } else {
        panic!("wrong message type");
    }
}

// ============================================================
// CLIENT MESSAGE TESTS
// ============================================================

#[test]
fn test_client_update_round_trip() {
    let msg = ClientRequest::Update {
        key: 7,
        value: "hello".to_string(),
    };

    let encoded = bincode::serialize(&msg).expect("failed to serialize request");
    let decoded: ClientRequest =
        bincode::deserialize(&encoded).expect("failed to deserialize request");

    if let ClientRequest::Update { key, value } = decoded {
        assert_eq!(key, 7);
        assert_eq!(value, "hello");
    } else {
        panic!("wrong request type");
    }
}

#[test]
fn test_client_error_round_trip() {
    let msg = ClientResponse::Error {
        node: 10,
        reason: "timeout for this operation has been reached".to_string(),
    };

    let encoded = bincode::serialize(&msg).expect("failed to serialize response");
    let decoded: ClientResponse =
        bincode::deserialize(&encoded).expect("failed to deserialize response");

    assert_eq!(decoded, msg);
}
