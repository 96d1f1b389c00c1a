//! Protocol codec for encoding/decoding messages
//!
//! Pure functions between [`GameEvent`] values and their fixed-length wire
//! form, plus the framing rule the receive path uses to know how many bytes
//! are still missing. Nothing here touches a socket.

use bytes::{BufMut, Bytes, BytesMut};
use thiserror::Error;

use super::{GameEvent, MessageKind, MoveKind, MoveMessage, PromotionKind, Side, Square};

/// Codec errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Empty message")]
    Empty,

    #[error("Unknown message kind tag: {0}")]
    UnknownKind(u8),

    #[error("Message kind {0} cannot be sent")]
    NotSendable(MessageKind),

    #[error("Wrong payload length for {kind}: expected {expected} bytes, got {actual}")]
    WrongLength {
        kind: MessageKind,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid value {value} for field {field}")]
    InvalidField { field: &'static str, value: u8 },
}

pub type CodecResult<T> = Result<T, CodecError>;

/// A complete message as read off the wire: tag byte followed by payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    kind: MessageKind,
    bytes: Bytes,
}

impl RawMessage {
    /// Wrap a complete wire buffer, checking the tag and length
    pub fn from_wire(bytes: Bytes) -> CodecResult<Self> {
        let kind = sendable_kind(*bytes.first().ok_or(CodecError::Empty)?)?;
        if bytes.len() != kind.wire_size() {
            return Err(CodecError::WrongLength {
                kind,
                expected: kind.payload_len(),
                actual: bytes.len().saturating_sub(1),
            });
        }
        Ok(Self { kind, bytes })
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    /// The bytes after the tag
    pub fn payload(&self) -> &[u8] {
        &self.bytes[1..]
    }

    /// The whole message, tag included
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Decode into a typed event
    pub fn to_event(&self) -> CodecResult<GameEvent> {
        decode(&self.bytes)
    }
}

fn sendable_kind(tag: u8) -> CodecResult<MessageKind> {
    match MessageKind::from_u8(tag) {
        Some(kind) if kind.is_sendable() => Ok(kind),
        Some(kind) => Err(CodecError::NotSendable(kind)),
        None => Err(CodecError::UnknownKind(tag)),
    }
}

/// Append `kind` and `payload` to `buf` as one message.
///
/// Fails without writing anything if the kind is `Invalid` or the payload
/// length does not match the kind's fixed size.
pub fn encode_frame(kind: MessageKind, payload: &[u8], buf: &mut BytesMut) -> CodecResult<()> {
    if !kind.is_sendable() {
        return Err(CodecError::NotSendable(kind));
    }
    if payload.len() != kind.payload_len() {
        return Err(CodecError::WrongLength {
            kind,
            expected: kind.payload_len(),
            actual: payload.len(),
        });
    }

    buf.reserve(kind.wire_size());
    buf.put_u8(kind.as_u8());
    buf.put_slice(payload);
    Ok(())
}

/// Payload bytes for an event, tag excluded
fn event_payload(event: &GameEvent) -> Vec<u8> {
    match event {
        GameEvent::WhichSide { side } => vec![*side as u8],
        GameEvent::Move(mv) => vec![
            mv.from.file,
            mv.from.rank,
            mv.to.file,
            mv.to.rank,
            mv.promotion as u8,
            mv.kind as u8,
        ],
        GameEvent::Resign
        | GameEvent::DrawOffer
        | GameEvent::RematchRequest
        | GameEvent::RematchAccept => Vec::new(),
    }
}

/// Append the wire form of an event to `buf`
pub fn encode(event: &GameEvent, buf: &mut BytesMut) -> CodecResult<()> {
    encode_frame(event.kind(), &event_payload(event), buf)
}

/// Decode a complete wire message into an event
pub fn decode(bytes: &[u8]) -> CodecResult<GameEvent> {
    let (&tag, payload) = bytes.split_first().ok_or(CodecError::Empty)?;
    let kind = sendable_kind(tag)?;
    if payload.len() != kind.payload_len() {
        return Err(CodecError::WrongLength {
            kind,
            expected: kind.payload_len(),
            actual: payload.len(),
        });
    }

    let event = match kind {
        MessageKind::WhichSide => GameEvent::WhichSide {
            side: Side::from_u8(payload[0]).ok_or(CodecError::InvalidField {
                field: "side",
                value: payload[0],
            })?,
        },
        MessageKind::Move => GameEvent::Move(MoveMessage {
            from: square(payload[0], payload[1])?,
            to: square(payload[2], payload[3])?,
            promotion: PromotionKind::from_u8(payload[4]).ok_or(CodecError::InvalidField {
                field: "promotion",
                value: payload[4],
            })?,
            kind: MoveKind::from_u8(payload[5]).ok_or(CodecError::InvalidField {
                field: "move_kind",
                value: payload[5],
            })?,
        }),
        MessageKind::Resign => GameEvent::Resign,
        MessageKind::DrawOffer => GameEvent::DrawOffer,
        MessageKind::RematchRequest => GameEvent::RematchRequest,
        MessageKind::RematchAccept => GameEvent::RematchAccept,
        MessageKind::Invalid => return Err(CodecError::NotSendable(kind)),
    };
    Ok(event)
}

fn square(file: u8, rank: u8) -> CodecResult<Square> {
    if file > 7 {
        return Err(CodecError::InvalidField { field: "file", value: file });
    }
    Square::new(file, rank).ok_or(CodecError::InvalidField { field: "rank", value: rank })
}

/// How many more bytes are needed to complete the message started in `partial`.
///
/// An empty buffer needs the tag byte; once the tag is known the rest follows
/// from the kind's fixed size. Returns 0 when `partial` holds a whole message.
pub fn bytes_needed(partial: &[u8]) -> CodecResult<usize> {
    match partial.first() {
        None => Ok(1),
        Some(&tag) => {
            let kind = sendable_kind(tag)?;
            Ok(kind.wire_size().saturating_sub(partial.len()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_move() -> MoveMessage {
        MoveMessage {
            from: Square { file: 6, rank: 1 },
            to: Square { file: 6, rank: 3 },
            promotion: PromotionKind::None,
            kind: MoveKind::Normal,
        }
    }

    fn encode_to_vec(event: &GameEvent) -> Vec<u8> {
        let mut buf = BytesMut::new();
        encode(event, &mut buf).unwrap();
        buf.to_vec()
    }

    fn all_events() -> Vec<GameEvent> {
        const PROMOTIONS: [PromotionKind; 5] = [
            PromotionKind::None,
            PromotionKind::Queen,
            PromotionKind::Rook,
            PromotionKind::Bishop,
            PromotionKind::Knight,
        ];
        const MOVE_KINDS: [MoveKind; 6] = [
            MoveKind::Normal,
            MoveKind::Capture,
            MoveKind::Castle,
            MoveKind::EnPassant,
            MoveKind::Promotion,
            MoveKind::PromotionCapture,
        ];

        let squares: Vec<Square> = (0..8)
            .flat_map(|file| (0..8).map(move |rank| Square { file, rank }))
            .collect();

        let mut events = vec![
            GameEvent::WhichSide { side: Side::White },
            GameEvent::WhichSide { side: Side::Black },
            GameEvent::Resign,
            GameEvent::DrawOffer,
            GameEvent::RematchRequest,
            GameEvent::RematchAccept,
        ];
        for &from in &squares {
            for &to in &squares {
                for promotion in PROMOTIONS {
                    for kind in MOVE_KINDS {
                        events.push(GameEvent::Move(MoveMessage { from, to, promotion, kind }));
                    }
                }
            }
        }
        events
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let events = all_events();
        assert_eq!(events.len(), 6 + 64 * 64 * 5 * 6);

        let mut buf = BytesMut::with_capacity(crate::protocol::MAX_WIRE_SIZE);
        for event in events {
            buf.clear();
            encode(&event, &mut buf).unwrap();
            assert_eq!(buf.len(), event.kind().wire_size());
            assert_eq!(buf[0], event.kind().as_u8());
            assert_eq!(decode(&buf), Ok(event));
        }
    }

    #[test]
    fn test_raw_frame_roundtrip() {
        for kind in MessageKind::SENDABLE {
            let payload: Vec<u8> = (1..=kind.payload_len() as u8).collect();
            let mut buf = BytesMut::new();
            encode_frame(kind, &payload, &mut buf).unwrap();

            let raw = RawMessage::from_wire(buf.freeze()).unwrap();
            assert_eq!(raw.kind(), kind);
            assert_eq!(raw.payload(), &payload[..]);
        }
    }

    #[test]
    fn test_move_wire_layout() {
        assert_eq!(
            encode_to_vec(&GameEvent::Move(sample_move())),
            vec![2, 6, 1, 6, 3, 0, 0]
        );
    }

    #[test]
    fn test_encode_appends_to_buffer() {
        let mut buf = BytesMut::new();
        encode(&GameEvent::Resign, &mut buf).unwrap();
        encode(&GameEvent::WhichSide { side: Side::Black }, &mut buf).unwrap();
        assert_eq!(&buf[..], &[3, 1, 1]);
    }

    #[test]
    fn test_encode_frame_rejects_wrong_length() {
        let mut buf = BytesMut::new();
        let err = encode_frame(MessageKind::Move, &[1, 2, 3], &mut buf).unwrap_err();
        assert_eq!(
            err,
            CodecError::WrongLength { kind: MessageKind::Move, expected: 6, actual: 3 }
        );
        assert!(buf.is_empty());

        let err = encode_frame(MessageKind::Resign, &[0], &mut buf).unwrap_err();
        assert!(matches!(err, CodecError::WrongLength { expected: 0, actual: 1, .. }));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_encode_frame_rejects_invalid_kind() {
        let mut buf = BytesMut::new();
        let err = encode_frame(MessageKind::Invalid, &[], &mut buf).unwrap_err();
        assert_eq!(err, CodecError::NotSendable(MessageKind::Invalid));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_rejects_bad_fields() {
        assert_eq!(
            decode(&[2, 8, 1, 6, 3, 0, 0]),
            Err(CodecError::InvalidField { field: "file", value: 8 })
        );
        assert_eq!(
            decode(&[2, 6, 1, 6, 9, 0, 0]),
            Err(CodecError::InvalidField { field: "rank", value: 9 })
        );
        assert_eq!(
            decode(&[2, 6, 1, 6, 3, 5, 0]),
            Err(CodecError::InvalidField { field: "promotion", value: 5 })
        );
        assert_eq!(
            decode(&[1, 2]),
            Err(CodecError::InvalidField { field: "side", value: 2 })
        );
    }

    #[test]
    fn test_decode_rejects_framing_errors() {
        assert_eq!(decode(&[]), Err(CodecError::Empty));
        assert_eq!(decode(&[42]), Err(CodecError::UnknownKind(42)));
        assert_eq!(decode(&[0]), Err(CodecError::NotSendable(MessageKind::Invalid)));
        assert!(matches!(decode(&[3, 0]), Err(CodecError::WrongLength { .. })));
    }

    #[test]
    fn test_bytes_needed() {
        assert_eq!(bytes_needed(&[]), Ok(1));
        assert_eq!(bytes_needed(&[2]), Ok(6));
        assert_eq!(bytes_needed(&[2, 6, 1]), Ok(4));
        assert_eq!(bytes_needed(&[2, 6, 1, 6, 3, 0, 0]), Ok(0));
        assert_eq!(bytes_needed(&[3]), Ok(0));
        assert_eq!(bytes_needed(&[99]), Err(CodecError::UnknownKind(99)));
    }

    #[test]
    fn test_raw_message_accessors() {
        let bytes = Bytes::from(encode_to_vec(&GameEvent::WhichSide { side: Side::Black }));
        let raw = RawMessage::from_wire(bytes).unwrap();
        assert_eq!(raw.kind(), MessageKind::WhichSide);
        assert_eq!(raw.payload(), &[1]);
        assert_eq!(raw.as_bytes(), &[1, 1]);
        assert_eq!(raw.to_event().unwrap(), GameEvent::WhichSide { side: Side::Black });

        assert!(RawMessage::from_wire(Bytes::from_static(&[2, 0])).is_err());
    }
}
