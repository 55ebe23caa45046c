//! GeoTIFF codec built around a negotiated raster model. `TiffOrigin` parses
//! a directory, maps its photometric layout onto one of our pixel models and
//! reads whole rasters or windows out of it. `TiffDestination` writes classic
//! little endian files back, with optional placement tags and a worldfile
//! sidecar. Monochrome sections travel as single strip Group 4 blobs.

mod destination;
mod fax;
mod negotiate;
mod origin;

pub use destination::{DestinationOptions, TiffChunkType, TiffDestination};
pub use negotiate::{Conversion, Photometric, RasterLayout, SampleFormatKind, TiffLayout, detect, negotiate};
pub use origin::{ChunkLayout, TiffCompression, TiffMetadata, TiffOrigin, Window};

use crate::{Error, Georeference, PixelType, Raster, Result};

/// Packs a monochrome raster into a single strip Group 4 TIFF, the blob
/// format bilevel sections are stored in.
pub fn encode_fax4_blob(raster: &Raster, georeference: Option<&Georeference>) -> Result<Vec<u8>> {
    if raster.pixel_type() != PixelType::Monochrome {
        return Err(Error::InvalidArgument(
            "Fax blobs only hold monochrome rasters".to_string(),
        ));
    }

    let options = DestinationOptions {
        chunk_type: TiffChunkType::SingleStrip,
        compression: TiffCompression::Fax4,
        georeference: georeference.cloned(),
        ..Default::default()
    };
    TiffDestination::new(options).write_memory(raster)
}

/// Reads a fax blob back along with the placement it was stored with.
pub fn decode_fax4_blob(encoded: &[u8]) -> Result<(Raster, Option<Georeference>)> {
    let mut origin = TiffOrigin::from_memory(encoded.to_vec())?;
    {
        let meta = origin.metadata();
        if meta.layout.pixel_type != PixelType::Monochrome || meta.compression != TiffCompression::Fax4 {
            return Err(Error::UnsupportedFormat(
                "Not a Group 4 monochrome blob".to_string(),
            ));
        }
    }

    let georeference = origin.metadata().georeference.clone();
    let raster = origin.read_raster()?;
    Ok((raster, georeference))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SampleBuffer, SampleType};
    use approx::assert_abs_diff_eq;

    #[test_log::test]
    fn fax_blobs_roundtrip_with_placement() -> Result {
        let bits: Vec<u8> = (0..40 * 11).map(|i| u8::from(i % 3 == 0)).collect();
        let raster = Raster::new(40, 11, SampleType::OneBit, PixelType::Monochrome, 1, SampleBuffer::U8(bits))?;
        let geo = Georeference::with_origin(150_000.0, 190_000.0, 0.5, 0.5, 40, 11).with_epsg(31370);

        let blob = encode_fax4_blob(&raster, Some(&geo))?;
        let (back, placement) = decode_fax4_blob(&blob)?;

        assert_eq!(back.typed_data::<u8>()?, raster.typed_data::<u8>()?);
        let placement = placement.expect("placement tags");
        assert_abs_diff_eq!(placement.min_x, geo.min_x);
        assert_abs_diff_eq!(placement.max_y, geo.max_y);
        assert_abs_diff_eq!(placement.y_res, 0.5);
        assert_eq!(placement.epsg, Some(31370));
        Ok(())
    }

    #[test]
    fn fax_blobs_only_hold_monochrome() -> Result {
        let gray = Raster::zeroed(4, 4, SampleType::UInt8, PixelType::Grayscale, 1)?;
        assert!(encode_fax4_blob(&gray, None).is_err());

        let plain = TiffDestination::with_defaults().write_memory(&gray)?;
        assert!(decode_fax4_blob(&plain).is_err());
        Ok(())
    }
}
