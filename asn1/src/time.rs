use ber::UniversalTag;
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::primitive::Primitive;

const GENERALIZED_TIME_FORMAT: &str = "%Y%m%d%H%M%S%.fZ";

/// `YYMMDDHHMMSSZ`. Two-digit years 50-99 are 19xx and 00-49 are 20xx.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UtcTime(pub NaiveDateTime);

/// `YYYYMMDDHHMMSS[.fff]Z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GeneralizedTime(pub NaiveDateTime);

impl UtcTime {
    pub fn can_represent(datetime: &NaiveDateTime) -> bool {
        (1950..=2049).contains(&datetime.year())
    }
}

impl Primitive for UtcTime {
    const TAG: UniversalTag = UniversalTag::UTCTime;

    fn decode_content(content: &[u8]) -> Result<Self, Error> {
        let invalid = || Error::UtcTimeInvalidFormat(String::from_utf8_lossy(content).into_owned());
        let digits = match content.split_last() {
            Some((&b'Z', digits)) if digits.len() == 12 && digits.iter().all(u8::is_ascii_digit) => {
                digits
            }
            _ => return Err(invalid()),
        };

        let pair = |i: usize| u32::from(digits[i] - b'0') * 10 + u32::from(digits[i + 1] - b'0');
        let yy = pair(0) as i32;
        let year = if yy >= 50 { 1900 + yy } else { 2000 + yy };
        NaiveDate::from_ymd_opt(year, pair(2), pair(4))
            .and_then(|date| date.and_hms_opt(pair(6), pair(8), pair(10)))
            .map(UtcTime)
            .ok_or_else(invalid)
    }

    fn encode_content(&self) -> Result<Vec<u8>, Error> {
        let t = &self.0;
        if !Self::can_represent(t) {
            return Err(Error::UtcTimeOutOfRange(t.year()));
        }
        let text = format!(
            "{:02}{:02}{:02}{:02}{:02}{:02}Z",
            t.year() % 100,
            t.month(),
            t.day(),
            t.hour(),
            t.minute(),
            t.second()
        );
        Ok(text.into_bytes())
    }
}

impl Primitive for GeneralizedTime {
    const TAG: UniversalTag = UniversalTag::GeneralizedTime;

    fn decode_content(content: &[u8]) -> Result<Self, Error> {
        let invalid =
            || Error::GeneralizedTimeInvalidFormat(String::from_utf8_lossy(content).into_owned());
        if content.len() < 15
            || !content[..14].iter().all(u8::is_ascii_digit)
            || content.last() != Some(&b'Z')
        {
            return Err(invalid());
        }
        let text = std::str::from_utf8(content).map_err(|_| invalid())?;
        NaiveDateTime::parse_from_str(text, GENERALIZED_TIME_FORMAT)
            .map(GeneralizedTime)
            .map_err(|_| invalid())
    }

    fn encode_content(&self) -> Result<Vec<u8>, Error> {
        let year = self.0.year();
        if !(0..=9999).contains(&year) {
            return Err(Error::GeneralizedTimeOutOfRange(year));
        }
        Ok(self
            .0
            .format(GENERALIZED_TIME_FORMAT)
            .to_string()
            .into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};
    use rstest::rstest;

    use super::{GeneralizedTime, UtcTime};
    use crate::primitive::Primitive;

    fn datetime(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[rstest]
    #[case(b"191215190210Z".as_slice(), datetime(2019, 12, 15, 19, 2, 10))]
    #[case(b"500101000000Z".as_slice(), datetime(1950, 1, 1, 0, 0, 0))]
    #[case(b"491231235959Z".as_slice(), datetime(2049, 12, 31, 23, 59, 59))]
    fn test_utc_time(#[case] content: &[u8], #[case] expected: NaiveDateTime) {
        let time = UtcTime::decode_content(content).unwrap();
        assert_eq!(time.0, expected);
        assert_eq!(time.encode_content().unwrap(), content);
    }

    #[rstest]
    #[case::offset(b"191215190210-0800".as_slice())]
    #[case::no_seconds(b"1912151902Z".as_slice())]
    #[case::bad_month(b"191315190210Z".as_slice())]
    #[case::not_digits(b"19121519021aZ".as_slice())]
    #[case::empty(b"".as_slice())]
    fn test_utc_time_error(#[case] content: &[u8]) {
        let err = UtcTime::decode_content(content).unwrap_err();
        assert!(format!("{:?}", err).contains("UtcTimeInvalidFormat"));
    }

    #[test]
    fn test_utc_time_out_of_range() {
        let err = UtcTime(datetime(2050, 1, 1, 0, 0, 0))
            .encode_content()
            .unwrap_err();
        assert!(format!("{:?}", err).contains("UtcTimeOutOfRange"));
    }

    #[rstest]
    #[case(b"20191216030210Z".as_slice(), datetime(2019, 12, 16, 3, 2, 10))]
    #[case(b"20500101000000Z".as_slice(), datetime(2050, 1, 1, 0, 0, 0))]
    fn test_generalized_time(#[case] content: &[u8], #[case] expected: NaiveDateTime) {
        let time = GeneralizedTime::decode_content(content).unwrap();
        assert_eq!(time.0, expected);
        assert_eq!(time.encode_content().unwrap(), content);
    }

    #[test]
    fn test_generalized_time_with_fraction() {
        let time = GeneralizedTime::decode_content(b"20250101120000.123Z").unwrap();
        assert_eq!(time.0.and_utc().timestamp_subsec_millis(), 123);
        assert_eq!(time.encode_content().unwrap(), b"20250101120000.123Z");
    }

    #[rstest]
    #[case::utc_time_length(b"191216030210Z".as_slice())]
    #[case::missing_zone(b"20191216030210".as_slice())]
    #[case::bad_day(b"20190230000000Z".as_slice())]
    fn test_generalized_time_error(#[case] content: &[u8]) {
        let err = GeneralizedTime::decode_content(content).unwrap_err();
        assert!(format!("{:?}", err).contains("GeneralizedTimeInvalidFormat"));
    }
}
