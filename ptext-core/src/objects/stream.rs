use crate::error::{PdfError, Result};
use crate::objects::{Dictionary, Object};
use std::borrow::Cow;

/// A stream: its dictionary, the raw (possibly encoded) bytes, and the
/// decoded bytes once they are known.
#[derive(Debug, Clone)]
pub struct Stream {
    dictionary: Dictionary,
    data: Vec<u8>,
    decoded: Option<Vec<u8>>,
}

impl Stream {
    pub fn new(data: Vec<u8>) -> Self {
        Self::with_dictionary(Dictionary::new(), data)
    }

    pub fn with_dictionary(dictionary: Dictionary, data: Vec<u8>) -> Self {
        let mut dict = dictionary;
        dict.set("Length", data.len());

        Self {
            dictionary: dict,
            data,
            decoded: None,
        }
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn dictionary_mut(&mut self) -> &mut Dictionary {
        &mut self.dictionary
    }

    /// Raw bytes, exactly as they are written between `stream` and `endstream`.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Names of the filters applied to the raw bytes, in decoding order.
    pub fn filters(&self) -> Vec<&str> {
        match self.dictionary.get("Filter") {
            Some(Object::Name(name)) => vec![name.as_str()],
            Some(Object::Array(names)) => names.iter().filter_map(Object::as_name).collect(),
            _ => Vec::new(),
        }
    }

    pub fn set_filter(&mut self, filter: &str) {
        self.dictionary.set("Filter", Object::name(filter));
    }

    /// Decoded bytes, from the cache when [`Stream::decode`] already ran.
    pub fn decoded_data(&self) -> Result<Cow<'_, [u8]>> {
        if let Some(decoded) = &self.decoded {
            return Ok(Cow::Borrowed(decoded));
        }
        let filters = self.filters();
        if filters.is_empty() {
            return Ok(Cow::Borrowed(&self.data));
        }

        let mut bytes = self.data.clone();
        for filter in filters {
            bytes = match filter {
                "FlateDecode" | "Fl" => {
                    self.check_no_predictor()?;
                    inflate(&bytes)?
                }
                other => return Err(PdfError::UnsupportedFilter(other.to_string())),
            };
        }
        Ok(Cow::Owned(bytes))
    }

    /// Decodes the raw bytes once and keeps the result.
    pub fn decode(&mut self) -> Result<&[u8]> {
        if self.decoded.is_none() {
            let decoded = self.decoded_data()?.into_owned();
            self.decoded = Some(decoded);
        }
        Ok(self.decoded.as_deref().unwrap_or_default())
    }

    fn check_no_predictor(&self) -> Result<()> {
        let predictor = self
            .dictionary
            .get_dict("DecodeParms")
            .and_then(|parms| parms.get("Predictor"))
            .and_then(Object::as_integer)
            .unwrap_or(1);
        if predictor > 1 {
            return Err(PdfError::UnsupportedFilter(format!(
                "FlateDecode with predictor {predictor}"
            )));
        }
        Ok(())
    }

    #[cfg(feature = "compression")]
    pub fn compress_flate(&mut self) -> Result<()> {
        use flate2::write::ZlibEncoder;
        use flate2::Compression;
        use std::io::Write;

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder
            .write_all(&self.data)
            .map_err(|e| PdfError::CompressionError(e.to_string()))?;
        let compressed = encoder
            .finish()
            .map_err(|e| PdfError::CompressionError(e.to_string()))?;

        self.decoded = Some(std::mem::replace(&mut self.data, compressed));
        self.dictionary.set("Length", self.data.len());
        self.set_filter("FlateDecode");

        Ok(())
    }
}

impl PartialEq for Stream {
    fn eq(&self, other: &Self) -> bool {
        self.dictionary == other.dictionary && self.data == other.data
    }
}

#[cfg(feature = "compression")]
fn inflate(bytes: &[u8]) -> Result<Vec<u8>> {
    use flate2::read::ZlibDecoder;
    use std::io::Read;

    let mut decoder = ZlibDecoder::new(bytes);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| PdfError::CompressionError(e.to_string()))?;
    Ok(out)
}

#[cfg(not(feature = "compression"))]
fn inflate(_bytes: &[u8]) -> Result<Vec<u8>> {
    Err(PdfError::UnsupportedFilter(
        "FlateDecode (compression feature disabled)".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_sets_length() {
        let stream = Stream::new(b"BT ET".to_vec());
        assert_eq!(stream.dictionary().get("Length"), Some(&Object::from(5)));
        assert_eq!(stream.data(), b"BT ET");
    }

    #[test]
    fn test_unfiltered_stream_decodes_to_itself() {
        let stream = Stream::new(b"0 0 m".to_vec());
        assert_eq!(stream.decoded_data().unwrap().as_ref(), b"0 0 m");
    }

    #[test]
    fn test_unsupported_filter() {
        let mut stream = Stream::new(b"xyz".to_vec());
        stream.set_filter("LZWDecode");
        match stream.decoded_data() {
            Err(PdfError::UnsupportedFilter(name)) => assert_eq!(name, "LZWDecode"),
            other => panic!("expected unsupported filter, got {other:?}"),
        }
    }

    #[cfg(feature = "compression")]
    #[test]
    fn test_compress_then_decode() {
        let content = b"q 1 0 0 1 0 0 cm BT /F1 12 Tf (Hello) Tj ET Q".repeat(8);
        let mut stream = Stream::new(content.clone());
        stream.compress_flate().unwrap();

        assert_eq!(stream.filters(), vec!["FlateDecode"]);
        assert!(stream.data().len() < content.len());
        assert_eq!(
            stream.dictionary().get("Length"),
            Some(&Object::from(stream.data().len()))
        );

        let fresh = Stream::with_dictionary(stream.dictionary().clone(), stream.data().to_vec());
        assert_eq!(fresh.decoded_data().unwrap().as_ref(), content.as_slice());
    }
}
