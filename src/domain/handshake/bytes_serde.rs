// Byte-string serde for fixed-size newtypes. Derived serde would encode
// `[u8; N]` as a plain tuple (and only up to N = 32); this keeps every
// fixed-size byte field on the wire as a byte string with a strict length
// check on deserialization.
#[macro_export]
macro_rules! impl_bytes_newtype_serde {
    ($name:ident, $len_const:expr) => {
        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
                s.serialize_bytes(&self.0)
            }
        }
        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
                struct V;
                impl<'de> serde::de::Visitor<'de> for V {
                    type Value = [u8; $len_const];
                    fn expecting(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
                        write!(f, "byte string of length {}", $len_const)
                    }
                    fn visit_bytes<E: serde::de::Error>(self, v: &[u8]) -> Result<Self::Value, E> {
                        if v.len() != $len_const {
                            return Err(E::invalid_length(v.len(), &self));
                        }
                        let mut a = [0u8; $len_const];
                        a.copy_from_slice(v);
                        Ok(a)
                    }
                    fn visit_seq<A: serde::de::SeqAccess<'de>>(
                        self,
                        mut seq: A,
                    ) -> Result<Self::Value, A::Error> {
                        let mut a = [0u8; $len_const];
                        let mut i = 0;
                        while let Some(byte) = seq.next_element::<u8>()? {
                            if i >= $len_const {
                                return Err(serde::de::Error::invalid_length(i, &self));
                            }
                            a[i] = byte;
                            i += 1;
                        }
                        if i != $len_const {
                            return Err(serde::de::Error::invalid_length(i, &self));
                        }
                        Ok(a)
                    }
                }
                let arr = d.deserialize_bytes(V)?;
                Ok($name(arr))
            }
        }
    };
}

#[cfg(test)]
mod tests {
    const TEST_LEN: usize = 48; // larger than the serde derive limit

    #[derive(Clone, PartialEq, Eq, Debug)]
    struct TestArr(pub [u8; TEST_LEN]);
    crate::impl_bytes_newtype_serde!(TestArr, TEST_LEN);

    #[test]
    fn round_trip_through_json() {
        let mut v = [0u8; TEST_LEN];
        for (i, b) in v.iter_mut().enumerate() {
            *b = i as u8;
        }
        let t = TestArr(v);
        let bytes = serde_json::to_vec(&t).unwrap();
        let de: TestArr = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(t, de);
    }

    #[test]
    fn wrong_length_rejected() {
        for n in [TEST_LEN - 1, TEST_LEN + 1] {
            let buf = serde_json::to_vec(&vec![9u8; n]).unwrap();
            let err = serde_json::from_slice::<TestArr>(&buf)
                .unwrap_err()
                .to_string();
            assert!(err.contains("invalid length"), "len {n}: {err}");
        }
    }
}
