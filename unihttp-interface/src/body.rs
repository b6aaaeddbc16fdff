//! Request body types.

use std::borrow::Cow;

/// A request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// Raw bytes sent with the given content type.
    Bytes {
        /// The body content.
        content: Cow<'static, [u8]>,
        /// Value of the `content-type` header.
        content_type: Cow<'static, str>,
    },
    /// `application/x-www-form-urlencoded` fields.
    Form {
        /// Field name and value pairs, in order.
        fields: Vec<(Cow<'static, str>, Cow<'static, str>)>,
    },
}

/// Content type of urlencoded form bodies.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

impl Body {
    /// The `content-type` this body is sent with.
    pub fn content_type(&self) -> &str {
        match self {
            Body::Bytes { content_type, .. } => content_type,
            Body::Form { .. } => FORM_CONTENT_TYPE,
        }
    }

    /// Serialize the body into the bytes sent over the wire.
    pub fn to_bytes(&self) -> Cow<'_, [u8]> {
        match self {
            Body::Bytes { content, .. } => Cow::Borrowed(content),
            Body::Form { fields } => {
                let encoded = form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(fields.iter().map(|(k, v)| (&**k, &**v)))
                    .finish();
                Cow::Owned(encoded.into_bytes())
            }
        }
    }
}
