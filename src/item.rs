use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use firefly_api::RawResponse;

/// One unit of input work: an opaque record of user-supplied parameters.
/// The connector only ever reads from it.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct Item(Map<String, Value>);

impl Item {
    pub(crate) fn resource(&self) -> Option<&str> {
        self.str_field("resource")
    }

    pub(crate) fn operation(&self) -> Option<&str> {
        self.str_field("operation")
    }

    /// Deserializes the item into an operation's parameter struct. Keys
    /// the struct does not declare (the selector fields included) are
    /// ignored.
    pub(crate) fn params<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.0.clone()))
    }

    fn str_field(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }
}

/// One result per processed item, in input order.
#[derive(Debug, Serialize)]
pub(crate) struct OutputRecord {
    pub(crate) json: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) binary: Option<Binary>,
}

impl OutputRecord {
    pub(crate) fn json(value: Value) -> Self {
        Self {
            json: value,
            binary: None,
        }
    }

    pub(crate) fn attachment(attachment: Attachment) -> Self {
        Self {
            json: Value::Object(Default::default()),
            binary: Some(Binary { data: attachment }),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct Binary {
    pub(crate) data: Attachment,
}

/// A downloaded export, bytes still undecoded.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Attachment {
    pub(crate) file_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) mime_type: Option<String>,
    #[serde(serialize_with = "as_base64")]
    pub(crate) data: Vec<u8>,
}

impl Attachment {
    pub(crate) fn new(file_name: String, res: RawResponse) -> Self {
        Self {
            file_name,
            mime_type: res.header("content-type").map(str::to_string),
            data: res.body,
        }
    }
}

fn as_base64<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&base64::encode(bytes))
}
