#![allow(dead_code)]

/// Typed-stream payload shaped like a Messages `attributedBody` column.
pub fn typedstream(text: &str) -> Vec<u8> {
    let mut data = b"\x04\x0bstreamtyped\x81\xe8\x03\x84\x01@\x84\x84\x84\x19NSMutableAttributedString\x00\x84\x84\x12NSAttributedString\x00\x84\x84\x08NSObject\x00\x85\x92\x84\x84\x84\x08NSString\x01\x94\x84\x01+".to_vec();
    let len = text.len();
    if len < 0x80 {
        data.push(len as u8);
    } else {
        data.push(0x81);
        data.extend_from_slice(&(len as u16).to_le_bytes());
    }
    data.extend_from_slice(text.as_bytes());
    data.extend_from_slice(b"\x86\x84\x02iI\x01\x05\x92\x84\x84\x84\x0cNSDictionary\x00\x94\x84\x01i\x01\x92\x84\x96\x96\x1d__kIMMessagePartAttributeName\x86\x86\x86");
    data
}

pub fn init_logging() {
    otp_logging::initialize_for_tests();
}
