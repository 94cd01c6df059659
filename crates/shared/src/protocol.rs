use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{Identity, Mood, Network, ObjectId, PackageId};

pub const MOOD_BOARD_MODULE: &str = "mood_board";
pub const SUBMIT_MOOD_FUNCTION: &str = "submit_mood";

/// Fully qualified Move function: `{package}::{module}::{function}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallTarget {
    pub package: PackageId,
    pub module: String,
    pub function: String,
}

impl CallTarget {
    pub fn submit_mood(package: PackageId) -> Self {
        Self {
            package,
            module: MOOD_BOARD_MODULE.to_string(),
            function: SUBMIT_MOOD_FUNCTION.to_string(),
        }
    }
}

impl fmt::Display for CallTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}::{}", self.package, self.module, self.function)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CallArg {
    Object(ObjectId),
    /// BCS-encoded pure value, base64 on the wire.
    Pure(#[serde(with = "pure_bytes_b64")] Vec<u8>),
}

impl CallArg {
    /// BCS encodes a `u8` as the single byte itself.
    pub fn pure_u8(value: u8) -> Self {
        CallArg::Pure(vec![value])
    }
}

mod pure_bytes_b64 {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveCall {
    #[serde(flatten)]
    pub target: CallTarget,
    pub arguments: Vec<CallArg>,
}

/// One vote for one mood on one board. Built fresh for every attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteRequest<'a> {
    pub board: &'a ObjectId,
    pub mood: Mood,
}

impl<'a> VoteRequest<'a> {
    pub fn new(board: &'a ObjectId, mood: Mood) -> Self {
        Self { board, mood }
    }

    pub fn to_move_call(&self, target: &CallTarget) -> MoveCall {
        MoveCall {
            target: target.clone(),
            arguments: vec![
                CallArg::Object(self.board.clone()),
                CallArg::pure_u8(self.mood.index()),
            ],
        }
    }
}

/// Body posted to the wallet bridge, which signs and submits on our behalf.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecuteRequest {
    pub sender: Identity,
    pub network: Network,
    pub call: MoveCall,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecuteResponse {
    pub digest: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> ObjectId {
        "0x00000000000000000000000000000000000000000000000000000000000b0a2d"
            .parse()
            .expect("board id")
    }

    fn package() -> PackageId {
        "0x0000000000000000000000000000000000000000000000000000000000000abc"
            .parse()
            .expect("package id")
    }

    #[test]
    fn vote_request_lowers_to_object_then_single_byte_argument() {
        let board = board();
        let target = CallTarget::submit_mood(package());

        let call = VoteRequest::new(&board, Mood::Bad).to_move_call(&target);

        assert_eq!(
            call.target.to_string(),
            format!("{}::mood_board::submit_mood", package())
        );
        assert_eq!(
            call.arguments,
            vec![CallArg::Object(board.clone()), CallArg::Pure(vec![2])]
        );
    }

    #[test]
    fn move_call_json_shape_is_flat_with_tagged_arguments() {
        let board = board();
        let target = CallTarget::submit_mood(package());
        let call = VoteRequest::new(&board, Mood::Neutral).to_move_call(&target);

        let value = serde_json::to_value(&call).expect("serialize");

        assert_eq!(value["package"], package().as_str());
        assert_eq!(value["module"], "mood_board");
        assert_eq!(value["function"], "submit_mood");
        assert_eq!(value["arguments"][0]["kind"], "object");
        assert_eq!(value["arguments"][0]["value"], board.as_str());
        assert_eq!(value["arguments"][1]["kind"], "pure");
        // 0x01 in base64
        assert_eq!(value["arguments"][1]["value"], "AQ==");

        let decoded: MoveCall = serde_json::from_value(value).expect("deserialize");
        assert_eq!(decoded, call);
    }
}
