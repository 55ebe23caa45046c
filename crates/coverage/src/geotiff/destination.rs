//! Writing half of the GeoTIFF codec. The classic little endian directory is
//! laid out by hand: chunk payloads first, then a single IFD with sorted
//! entries and an overflow area for values wider than four bytes.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::fax;
use super::negotiate::{Photometric, SampleFormatKind};
use super::origin::TiffCompression;
use crate::{
    Error, Georeference, MemoryStream, Palette, PixelType, Raster, RasterNum, Result, SampleType,
    dispatch_sampletype_nowrap, worldfile,
};

const STRIP_TARGET_BYTES: usize = 8 * 1024;

const TYPE_ASCII: u16 = 2;
const TYPE_SHORT: u16 = 3;
const TYPE_LONG: u16 = 4;
const TYPE_DOUBLE: u16 = 12;

/// How the destination chops pixel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TiffChunkType {
    /// Strips sized towards an 8 KiB payload, at least one row each.
    Striped,
    /// The whole image in one strip, the layout the fax blobs use.
    SingleStrip,
    /// Square tiles with the given edge, a multiple of 16.
    Tiled(u32),
}

#[derive(Debug, Clone)]
pub struct DestinationOptions {
    pub chunk_type: TiffChunkType,
    pub compression: TiffCompression,
    pub georeference: Option<Georeference>,
    pub nodata: Option<f64>,
    /// Also write a `.tfw` sidecar next to the file.
    pub worldfile: bool,
}

impl Default for DestinationOptions {
    fn default() -> Self {
        DestinationOptions {
            chunk_type: TiffChunkType::Striped,
            compression: TiffCompression::None,
            georeference: None,
            nodata: None,
            worldfile: false,
        }
    }
}

/// TIFF writer. Multiband rasters always go out with one plane per band;
/// everything else is interleaved.
pub struct TiffDestination {
    options: DestinationOptions,
}

impl TiffDestination {
    pub fn new(options: DestinationOptions) -> Self {
        TiffDestination { options }
    }

    pub fn with_defaults() -> Self {
        TiffDestination::new(DestinationOptions::default())
    }

    pub fn write_file(&self, path: impl AsRef<Path>, raster: &Raster) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|_| Error::InvalidPath(path.to_path_buf()))?;
        let mut stream = BufWriter::new(file);
        self.write_stream(&mut stream, raster)?;
        stream.flush()?;

        if self.options.worldfile {
            let geo = self
                .options
                .georeference
                .as_ref()
                .ok_or_else(|| Error::InvalidArgument("A worldfile sidecar needs a georeference".to_string()))?;
            worldfile::write_for(path, geo)?;
        }

        Ok(())
    }

    pub fn write_memory(&self, raster: &Raster) -> Result<Vec<u8>> {
        if self.options.worldfile {
            return Err(Error::InvalidArgument(
                "Worldfile sidecars need a file destination".to_string(),
            ));
        }

        let mut stream = MemoryStream::new();
        self.write_stream(&mut stream, raster)?;
        Ok(stream.into_vec())
    }

    fn write_stream<W: Write>(&self, stream: &mut W, raster: &Raster) -> Result<()> {
        self.validate(raster)?;
        let plan = ChunkPlan::new(raster, &self.options);
        let chunks = encode_chunks(raster, &plan, self.options.compression)?;
        write_classic_tiff(stream, raster, &self.options, &plan, &chunks)
    }

    fn validate(&self, raster: &Raster) -> Result<()> {
        match self.options.compression {
            TiffCompression::Zstd => {
                return Err(Error::InvalidArgument("Zstd compression is decode only".to_string()));
            }
            TiffCompression::Fax4 if raster.pixel_type() != PixelType::Monochrome => {
                return Err(Error::InvalidArgument(
                    "Group 4 compression only covers monochrome rasters".to_string(),
                ));
            }
            _ => {}
        }

        if let TiffChunkType::Tiled(size) = self.options.chunk_type {
            if size == 0 || size % 16 != 0 {
                return Err(Error::InvalidArgument(format!(
                    "Tile edges must be a positive multiple of 16, got {}",
                    size
                )));
            }
        }

        if raster.pixel_type() == PixelType::Palette && raster.palette().is_none() {
            return Err(Error::InvalidArgument(
                "The palette raster carries no color table".to_string(),
            ));
        }

        if let Some(geo) = &self.options.georeference {
            if !geo.is_valid() {
                return Err(Error::InvalidArgument(format!("Invalid georeference: {:?}", geo)));
            }
        }

        Ok(())
    }
}

struct ChunkPlan {
    chunk_width: usize,
    chunk_height: usize,
    chunks_x: usize,
    chunks_y: usize,
    planes: usize,
    tiled: bool,
}

impl ChunkPlan {
    fn new(raster: &Raster, options: &DestinationOptions) -> Self {
        let width = raster.width() as usize;
        let height = raster.height() as usize;
        let planes = if raster.pixel_type() == PixelType::Multiband {
            raster.bands()
        } else {
            1
        };
        let chunk_bands = if planes > 1 { 1 } else { raster.bands() };

        let (chunk_width, chunk_height, tiled) = match options.chunk_type {
            TiffChunkType::Tiled(size) => (size as usize, size as usize, true),
            TiffChunkType::SingleStrip => (width, height, false),
            TiffChunkType::Striped => {
                let row_bytes = row_byte_length(raster.sample_type(), width, chunk_bands);
                let rows = (STRIP_TARGET_BYTES / row_bytes.max(1)).clamp(1, height);
                (width, rows, false)
            }
        };

        ChunkPlan {
            chunk_width,
            chunk_height,
            chunks_x: width.div_ceil(chunk_width),
            chunks_y: height.div_ceil(chunk_height),
            planes,
            tiled,
        }
    }

    fn chunk_count(&self) -> usize {
        self.chunks_x * self.chunks_y * self.planes
    }
}

fn row_byte_length(sample_type: SampleType, cols: usize, bands: usize) -> usize {
    if sample_type.is_sub_byte() {
        (cols * sample_type.bits() as usize).div_ceil(8)
    } else {
        cols * sample_type.byte_width() * bands
    }
}

fn encode_chunks(raster: &Raster, plan: &ChunkPlan, compression: TiffCompression) -> Result<Vec<Vec<u8>>> {
    let mut chunks = Vec::with_capacity(plan.chunk_count());

    dispatch_sampletype_nowrap!(raster.sample_type(), T, {
        let samples = raster.typed_data::<T>()?;
        for plane in 0..plan.planes {
            let plane_band = (plan.planes > 1).then_some(plane);
            for chunk_y in 0..plan.chunks_y {
                for chunk_x in 0..plan.chunks_x {
                    let (chunk, cols, rows) = extract_chunk(samples, raster, plan, plane_band, chunk_x, chunk_y);
                    chunks.push(serialize_chunk(&chunk, raster.sample_type(), cols, rows, compression)?);
                }
            }
        }
    });

    Ok(chunks)
}

fn extract_chunk<T: RasterNum>(
    samples: &[T],
    raster: &Raster,
    plan: &ChunkPlan,
    plane: Option<usize>,
    chunk_x: usize,
    chunk_y: usize,
) -> (Vec<T>, usize, usize) {
    let width = raster.width() as usize;
    let height = raster.height() as usize;
    let bands = raster.bands();

    let col0 = chunk_x * plan.chunk_width;
    let row0 = chunk_y * plan.chunk_height;
    let present_cols = plan.chunk_width.min(width - col0);
    let present_rows = plan.chunk_height.min(height - row0);

    // tiles always store their full edge, strips store the remaining rows
    let (store_cols, store_rows) = if plan.tiled {
        (plan.chunk_width, plan.chunk_height)
    } else {
        (width, present_rows)
    };

    match plane {
        None => {
            let mut chunk = vec![T::zero(); store_cols * store_rows * bands];
            for row in 0..present_rows {
                let src = ((row0 + row) * width + col0) * bands;
                let dst = row * store_cols * bands;
                chunk[dst..dst + present_cols * bands].copy_from_slice(&samples[src..src + present_cols * bands]);
            }
            (chunk, store_cols, store_rows)
        }
        Some(band) => {
            let mut chunk = vec![T::zero(); store_cols * store_rows];
            for row in 0..present_rows {
                for col in 0..present_cols {
                    chunk[row * store_cols + col] = samples[((row0 + row) * width + col0 + col) * bands + band];
                }
            }
            (chunk, store_cols, store_rows)
        }
    }
}

fn serialize_chunk<T: RasterNum>(
    samples: &[T],
    sample_type: SampleType,
    cols: usize,
    rows: usize,
    compression: TiffCompression,
) -> Result<Vec<u8>> {
    if compression == TiffCompression::Fax4 {
        return fax::encode(cast_to_u8(samples)?, cols, rows);
    }

    let packed = if sample_type.is_sub_byte() {
        pack_bits(cast_to_u8(samples)?, sample_type.bits(), cols, rows)
    } else {
        let mut bytes = bytemuck::cast_slice::<T, u8>(samples).to_vec();
        if cfg!(target_endian = "big") {
            let sample_width = std::mem::size_of::<T>();
            for sample in bytes.chunks_exact_mut(sample_width) {
                sample.reverse();
            }
        }
        bytes
    };

    match compression {
        TiffCompression::Lzw => lzw_compress(&packed),
        _ => Ok(packed),
    }
}

fn cast_to_u8<T: RasterNum>(samples: &[T]) -> Result<&[u8]> {
    if T::TYPE != SampleType::UInt8 {
        return Err(Error::Runtime("Bilevel data packs from byte samples".to_string()));
    }

    Ok(bytemuck::cast_slice(samples))
}

/// MSB first bit packing; every row starts on a byte boundary.
fn pack_bits(samples: &[u8], bits: u16, cols: usize, rows: usize) -> Vec<u8> {
    let bits = bits as usize;
    let row_bytes = (cols * bits).div_ceil(8);

    let mut packed = vec![0u8; row_bytes * rows];
    for row in 0..rows {
        let base = row * row_bytes;
        for col in 0..cols {
            let bit = col * bits;
            let shift = 8 - bits - bit % 8;
            packed[base + bit / 8] |= samples[row * cols + col] << shift;
        }
    }

    packed
}

fn lzw_compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut compressed = Vec::new();
    let result = weezl::encode::Encoder::with_tiff_size_switch(weezl::BitOrder::Msb, 8)
        .into_stream(&mut compressed)
        .encode_all(data);
    result.status?;
    Ok(compressed)
}

struct IfdEntry {
    tag: u16,
    field_type: u16,
    count: u32,
    /// Little endian value payload, inlined when it fits four bytes.
    value: Vec<u8>,
}

fn short_values(tag: u16, values: &[u16]) -> IfdEntry {
    IfdEntry {
        tag,
        field_type: TYPE_SHORT,
        count: values.len() as u32,
        value: values.iter().flat_map(|v| v.to_le_bytes()).collect(),
    }
}

fn long_values(tag: u16, values: &[u32]) -> IfdEntry {
    IfdEntry {
        tag,
        field_type: TYPE_LONG,
        count: values.len() as u32,
        value: values.iter().flat_map(|v| v.to_le_bytes()).collect(),
    }
}

fn double_values(tag: u16, values: &[f64]) -> IfdEntry {
    IfdEntry {
        tag,
        field_type: TYPE_DOUBLE,
        count: values.len() as u32,
        value: values.iter().flat_map(|v| v.to_le_bytes()).collect(),
    }
}

fn ascii_value(tag: u16, text: &str) -> IfdEntry {
    let mut value = text.as_bytes().to_vec();
    value.push(0);
    IfdEntry {
        tag,
        field_type: TYPE_ASCII,
        count: value.len() as u32,
        value,
    }
}

fn build_entries(
    raster: &Raster,
    options: &DestinationOptions,
    plan: &ChunkPlan,
    chunks: &[Vec<u8>],
    offsets: &[u32],
) -> Vec<IfdEntry> {
    let sample_type = raster.sample_type();
    let samples_per_pixel = raster.bands() as u16;
    let sizes: Vec<u32> = chunks.iter().map(|chunk| chunk.len() as u32).collect();

    let mut entries = vec![
        long_values(256, &[raster.width()]),
        long_values(257, &[raster.height()]),
        short_values(258, &vec![sample_type.bits(); samples_per_pixel as usize]),
        short_values(259, &[options.compression.tag_value()]),
        short_values(262, &[photometric_for(raster.pixel_type()).tag_value()]),
        short_values(277, &[samples_per_pixel]),
        short_values(284, &[if plan.planes > 1 { 2 } else { 1 }]),
        short_values(
            339,
            &vec![sample_format_for(sample_type).tag_value(); samples_per_pixel as usize],
        ),
    ];

    if plan.tiled {
        entries.push(long_values(322, &[plan.chunk_width as u32]));
        entries.push(long_values(323, &[plan.chunk_height as u32]));
        entries.push(long_values(324, offsets));
        entries.push(long_values(325, &sizes));
    } else {
        entries.push(long_values(273, offsets));
        entries.push(long_values(278, &[plan.chunk_height as u32]));
        entries.push(long_values(279, &sizes));
    }

    if raster.pixel_type() == PixelType::Palette {
        if let Some(palette) = raster.palette() {
            entries.push(short_values(320, &color_map_planes(palette, sample_type)));
        }
    }

    if let Some(geo) = &options.georeference {
        entries.push(double_values(33550, &[geo.x_res, geo.y_res, 0.0]));
        entries.push(double_values(33922, &[0.0, 0.0, 0.0, geo.min_x, geo.max_y, 0.0]));
        if let Some(epsg) = geo.epsg {
            if epsg <= u32::from(u16::MAX) {
                entries.push(short_values(34735, &geo_key_directory(epsg)));
            }
        }
    }

    if let Some(nodata) = options.nodata {
        entries.push(ascii_value(42113, &nodata.to_string()));
    }

    entries.sort_by_key(|entry| entry.tag);
    entries
}

fn photometric_for(pixel_type: PixelType) -> Photometric {
    match pixel_type {
        PixelType::Monochrome => Photometric::MinIsWhite,
        PixelType::Palette => Photometric::Palette,
        PixelType::Rgb => Photometric::Rgb,
        PixelType::Grayscale | PixelType::Multiband | PixelType::DataGrid => Photometric::MinIsBlack,
    }
}

fn sample_format_for(sample_type: SampleType) -> SampleFormatKind {
    if sample_type.is_float() {
        SampleFormatKind::Float
    } else if sample_type.is_signed() {
        SampleFormatKind::SignedInt
    } else {
        SampleFormatKind::UnsignedInt
    }
}

/// One 16 bit plane per channel sized to the full index range, reds first.
/// Entries are scaled up by 256; slots past the palette stay black.
fn color_map_planes(palette: &Palette, sample_type: SampleType) -> Vec<u16> {
    let plane = 1usize << sample_type.bits();
    let mut values = vec![0u16; plane * 3];
    for (i, color) in palette.entries().iter().enumerate() {
        values[i] = u16::from(color.r) << 8;
        values[plane + i] = u16::from(color.g) << 8;
        values[2 * plane + i] = u16::from(color.b) << 8;
    }

    values
}

fn geo_key_directory(epsg: u32) -> Vec<u16> {
    let geographic = epsg_is_geographic(epsg);
    let mut keys = vec![1u16, 1, 0, 3];
    keys.extend_from_slice(&[1024, 0, 1, if geographic { 2 } else { 1 }]);
    keys.extend_from_slice(&[1025, 0, 1, 1]); // pixel is area
    if geographic {
        keys.extend_from_slice(&[2048, 0, 1, epsg as u16]);
    } else {
        keys.extend_from_slice(&[3072, 0, 1, epsg as u16]);
    }

    keys
}

/// The common geographic systems get the geographic key, everything else is
/// treated as projected.
fn epsg_is_geographic(epsg: u32) -> bool {
    matches!(epsg, 4326 | 4269 | 4258)
}

fn write_classic_tiff<W: Write>(
    stream: &mut W,
    raster: &Raster,
    options: &DestinationOptions,
    plan: &ChunkPlan,
    chunks: &[Vec<u8>],
) -> Result<()> {
    // chunk payloads follow the 8 byte header, each starting on an even
    // offset; the IFD comes after the last payload
    let mut offsets: Vec<u32> = Vec::with_capacity(chunks.len());
    let mut position: u64 = 8;
    for chunk in chunks {
        offsets.push(position as u32);
        position += chunk.len() as u64;
        position += position % 2;
    }
    let ifd_offset = position;

    let entries = build_entries(raster, options, plan, chunks, &offsets);
    let overflow: u64 = entries
        .iter()
        .filter(|entry| entry.value.len() > 4)
        .map(|entry| entry.value.len() as u64 + 1)
        .sum();
    if ifd_offset + 2 + entries.len() as u64 * 12 + 4 + overflow > u64::from(u32::MAX) {
        return Err(Error::InvalidArgument(
            "The raster does not fit a classic TIFF".to_string(),
        ));
    }

    stream.write_all(b"II")?;
    stream.write_all(&42u16.to_le_bytes())?;
    stream.write_all(&(ifd_offset as u32).to_le_bytes())?;

    let mut position: u64 = 8;
    for chunk in chunks {
        stream.write_all(chunk)?;
        position += chunk.len() as u64;
        if position % 2 == 1 {
            stream.write_all(&[0])?;
            position += 1;
        }
    }

    write_ifd(stream, ifd_offset, &entries)
}

fn write_ifd<W: Write>(stream: &mut W, ifd_offset: u64, entries: &[IfdEntry]) -> Result<()> {
    let value_base = ifd_offset + 2 + entries.len() as u64 * 12 + 4;
    let mut overflow: Vec<u8> = Vec::new();

    stream.write_all(&(entries.len() as u16).to_le_bytes())?;
    for entry in entries {
        stream.write_all(&entry.tag.to_le_bytes())?;
        stream.write_all(&entry.field_type.to_le_bytes())?;
        stream.write_all(&entry.count.to_le_bytes())?;
        if entry.value.len() <= 4 {
            let mut inline = [0u8; 4];
            inline[..entry.value.len()].copy_from_slice(&entry.value);
            stream.write_all(&inline)?;
        } else {
            if overflow.len() % 2 == 1 {
                overflow.push(0);
            }
            let offset = value_base + overflow.len() as u64;
            stream.write_all(&(offset as u32).to_le_bytes())?;
            overflow.extend_from_slice(&entry.value);
        }
    }

    stream.write_all(&0u32.to_le_bytes())?;
    stream.write_all(&overflow)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::negotiate::RasterLayout;
    use crate::geotiff::{ChunkLayout, TiffOrigin, Window};
    use crate::{Pixel, PixelValue, Rgb, SampleBuffer};
    use approx::assert_abs_diff_eq;
    use rand::prelude::*;
    use std::sync::Arc;

    fn roundtrip(raster: &Raster, options: DestinationOptions) -> Result<Raster> {
        let encoded = TiffDestination::new(options).write_memory(raster)?;
        TiffOrigin::from_memory(encoded)?.read_raster()
    }

    #[test_log::test]
    fn grayscale_strips_roundtrip() -> Result {
        let samples: Vec<u8> = (0..100u32 * 200).map(|i| (i % 251) as u8).collect();
        let raster = Raster::new(100, 200, SampleType::UInt8, PixelType::Grayscale, 1, SampleBuffer::U8(samples))?;

        let encoded = TiffDestination::with_defaults().write_memory(&raster)?;
        assert_eq!(&encoded[..4], b"II\x2a\x00");

        let mut origin = TiffOrigin::from_memory(encoded)?;
        // 8 KiB target over 100 byte rows
        assert_eq!(origin.metadata().chunk_layout, ChunkLayout::Striped(81));
        assert!(!origin.metadata().planar_separate);

        let back = origin.read_raster()?;
        assert_eq!(back.typed_data::<u8>()?, raster.typed_data::<u8>()?);
        Ok(())
    }

    #[test_log::test]
    fn lzw_rgb_roundtrip() -> Result {
        let mut rng = StdRng::seed_from_u64(4021);
        let samples: Vec<u8> = (0..64 * 48 * 3).map(|_| rng.random()).collect();
        let raster = Raster::new(64, 48, SampleType::UInt8, PixelType::Rgb, 3, SampleBuffer::U8(samples))?;

        let options = DestinationOptions {
            compression: TiffCompression::Lzw,
            ..Default::default()
        };
        let encoded = TiffDestination::new(options).write_memory(&raster)?;

        let mut origin = TiffOrigin::from_memory(encoded)?;
        assert_eq!(origin.metadata().compression, TiffCompression::Lzw);
        assert_eq!(
            origin.metadata().layout,
            RasterLayout::new(SampleType::UInt8, PixelType::Rgb, 3)
        );

        let back = origin.read_raster()?;
        assert_eq!(back.typed_data::<u8>()?, raster.typed_data::<u8>()?);
        Ok(())
    }

    #[test_log::test]
    fn tiled_edges_are_clipped() -> Result {
        let samples: Vec<u16> = (0..40u16 * 25).collect();
        let raster = Raster::new(40, 25, SampleType::UInt16, PixelType::Grayscale, 1, SampleBuffer::U16(samples))?;

        let options = DestinationOptions {
            chunk_type: TiffChunkType::Tiled(16),
            ..Default::default()
        };
        let encoded = TiffDestination::new(options).write_memory(&raster)?;

        let mut origin = TiffOrigin::from_memory(encoded)?;
        assert_eq!(origin.metadata().chunk_layout, ChunkLayout::Tiled(16));

        let back = origin.read_raster()?;
        assert_eq!(back.typed_data::<u16>()?, raster.typed_data::<u16>()?);

        // a window across the right and bottom edges keeps the void fill there
        let window = Window::new(30, 20, 16, 10);
        let void = Pixel::new(SampleType::UInt16, PixelType::Grayscale, vec![PixelValue::U16(0xFFFF)])?;
        let windowed = origin.read_window(&window, &void)?;
        let data = windowed.typed_data::<u16>()?;
        assert_eq!(data[0], 20 * 40 + 30);
        assert_eq!(data[9], 20 * 40 + 39);
        assert_eq!(data[10], 0xFFFF);
        assert_eq!(data[4 * 16], 24 * 40 + 30);
        assert_eq!(data[5 * 16], 0xFFFF);
        Ok(())
    }

    #[test_log::test]
    fn multiband_writes_separate_planes() -> Result {
        let mut samples = Vec::new();
        for pixel in 0..10u16 * 6 {
            for band in 0..4u16 {
                samples.push(pixel * 10 + band);
            }
        }
        let raster = Raster::new(10, 6, SampleType::UInt16, PixelType::Multiband, 4, SampleBuffer::U16(samples))?;

        let encoded = TiffDestination::with_defaults().write_memory(&raster)?;
        let mut origin = TiffOrigin::from_memory(encoded)?;
        assert!(origin.metadata().planar_separate);
        assert_eq!(
            origin.metadata().layout,
            RasterLayout::new(SampleType::UInt16, PixelType::Multiband, 4)
        );
        let back = origin.read_raster()?;
        assert_eq!(back.typed_data::<u16>()?, raster.typed_data::<u16>()?);

        let tiled = DestinationOptions {
            chunk_type: TiffChunkType::Tiled(16),
            compression: TiffCompression::Lzw,
            ..Default::default()
        };
        let back = roundtrip(&raster, tiled)?;
        assert_eq!(back.typed_data::<u16>()?, raster.typed_data::<u16>()?);
        Ok(())
    }

    #[test_log::test]
    fn palette_colormap_survives() -> Result {
        let palette = Palette::new(vec![
            Rgb::new(0, 0, 0),
            Rgb::new(255, 0, 0),
            Rgb::new(0, 255, 0),
            Rgb::new(0, 0, 255),
            Rgb::new(255, 255, 0),
            Rgb::new(0, 255, 255),
            Rgb::new(255, 255, 255),
        ])?;
        let indexes = vec![0u8, 1, 2, 3, 4, 5, 6, 0, 1, 2, 3, 4, 5, 6, 0];
        let raster = Raster::new(5, 3, SampleType::FourBit, PixelType::Palette, 1, SampleBuffer::U8(indexes))?
            .with_palette(Arc::new(palette.clone()))?;

        let back = roundtrip(&raster, DestinationOptions::default())?;
        assert_eq!(back.pixel_type(), PixelType::Palette);
        assert_eq!(back.sample_type(), SampleType::FourBit);
        assert_eq!(back.typed_data::<u8>()?, raster.typed_data::<u8>()?);

        // the color map covers the full 4 bit index range, real entries first
        let read_palette = back.palette().expect("palette attached");
        assert_eq!(read_palette.len(), 16);
        assert_eq!(&read_palette.entries()[..7], palette.entries());
        assert_eq!(read_palette.get(7), Some(Rgb::black()));
        Ok(())
    }

    #[test_log::test]
    fn fax_monochrome_roundtrip() -> Result {
        let mut rng = StdRng::seed_from_u64(814);
        let bits: Vec<u8> = (0..23 * 7).map(|_| u8::from(rng.random_bool(0.4))).collect();
        let raster = Raster::new(23, 7, SampleType::OneBit, PixelType::Monochrome, 1, SampleBuffer::U8(bits))?;

        let options = DestinationOptions {
            compression: TiffCompression::Fax4,
            ..Default::default()
        };
        let encoded = TiffDestination::new(options).write_memory(&raster)?;

        let mut origin = TiffOrigin::from_memory(encoded)?;
        assert_eq!(origin.metadata().compression, TiffCompression::Fax4);
        let back = origin.read_raster()?;
        assert_eq!(back.typed_data::<u8>()?, raster.typed_data::<u8>()?);
        Ok(())
    }

    #[test_log::test]
    fn placement_and_nodata_survive() -> Result {
        let samples: Vec<f32> = (0..8 * 4).map(|i| i as f32 / 2.0).collect();
        let raster = Raster::new(8, 4, SampleType::Float32, PixelType::DataGrid, 1, SampleBuffer::F32(samples))?;

        let geo = Georeference::with_origin(100_000.0, 220_000.0, 25.0, 25.0, 8, 4).with_epsg(31370);
        let options = DestinationOptions {
            georeference: Some(geo.clone()),
            nodata: Some(-9999.0),
            ..Default::default()
        };
        let encoded = TiffDestination::new(options).write_memory(&raster)?;

        let mut origin = TiffOrigin::from_memory(encoded)?;
        let read_geo = origin.metadata().georeference.clone().expect("placement tags");
        assert_abs_diff_eq!(read_geo.min_x, geo.min_x);
        assert_abs_diff_eq!(read_geo.max_y, geo.max_y);
        assert_abs_diff_eq!(read_geo.x_res, 25.0);
        assert_abs_diff_eq!(read_geo.y_res, 25.0);
        assert_eq!(read_geo.epsg, Some(31370));

        let nodata = origin.metadata().nodata_pixel().expect("nodata tag");
        assert_eq!(nodata.typed_values::<f32>(), Some(vec![-9999.0f32]));

        let back = origin.read_raster()?;
        assert_eq!(back.typed_data::<f32>()?, raster.typed_data::<f32>()?);
        Ok(())
    }

    #[test_log::test]
    fn geographic_codes_use_their_own_key() -> Result {
        let raster = Raster::zeroed(4, 4, SampleType::UInt8, PixelType::Grayscale, 1)?;
        let geo = Georeference::with_origin(4.0, 51.0, 0.01, 0.01, 4, 4).with_epsg(4326);
        let options = DestinationOptions {
            georeference: Some(geo),
            ..Default::default()
        };
        let encoded = TiffDestination::new(options).write_memory(&raster)?;

        let origin = TiffOrigin::from_memory(encoded)?;
        let read_geo = origin.metadata().georeference.clone().expect("placement tags");
        assert_eq!(read_geo.epsg, Some(4326));
        Ok(())
    }

    #[test]
    fn signed_grids_roundtrip() -> Result {
        let samples: Vec<i16> = (0..12).map(|i| i * -311).collect();
        let raster = Raster::new(4, 3, SampleType::Int16, PixelType::DataGrid, 1, SampleBuffer::I16(samples))?;

        let options = DestinationOptions {
            compression: TiffCompression::Lzw,
            ..Default::default()
        };
        let back = roundtrip(&raster, options)?;
        assert_eq!(back.sample_type(), SampleType::Int16);
        assert_eq!(back.pixel_type(), PixelType::DataGrid);
        assert_eq!(back.typed_data::<i16>()?, raster.typed_data::<i16>()?);
        Ok(())
    }

    #[test]
    fn conversions_apply_on_read() -> Result {
        let samples: Vec<u8> = (0..16).map(|i| i * 16).collect();
        let raster = Raster::new(4, 4, SampleType::UInt8, PixelType::Grayscale, 1, SampleBuffer::U8(samples))?;
        let encoded = TiffDestination::with_defaults().write_memory(&raster)?;

        let mut origin = TiffOrigin::from_memory(encoded)?;
        let target = RasterLayout::new(SampleType::UInt8, PixelType::Palette, 1);
        let indexed = origin.read_raster_as(&target)?;
        assert_eq!(indexed.pixel_type(), PixelType::Palette);
        assert_eq!(indexed.palette().map(|p| p.len()), Some(256));
        assert_eq!(indexed.typed_data::<u8>()?, raster.typed_data::<u8>()?);
        Ok(())
    }

    #[test]
    fn invalid_options_are_refused() -> Result {
        let gray = Raster::zeroed(4, 4, SampleType::UInt8, PixelType::Grayscale, 1)?;

        let odd_tile = TiffDestination::new(DestinationOptions {
            chunk_type: TiffChunkType::Tiled(20),
            ..Default::default()
        });
        assert!(odd_tile.write_memory(&gray).is_err());

        let fax_on_gray = TiffDestination::new(DestinationOptions {
            compression: TiffCompression::Fax4,
            ..Default::default()
        });
        assert!(fax_on_gray.write_memory(&gray).is_err());

        let zstd = TiffDestination::new(DestinationOptions {
            compression: TiffCompression::Zstd,
            ..Default::default()
        });
        assert!(zstd.write_memory(&gray).is_err());

        let sidecar_in_memory = TiffDestination::new(DestinationOptions {
            worldfile: true,
            georeference: Some(Georeference::with_origin(0.0, 4.0, 1.0, 1.0, 4, 4)),
            ..Default::default()
        });
        assert!(sidecar_in_memory.write_memory(&gray).is_err());
        Ok(())
    }

    #[test_log::test]
    fn worldfile_sidecars_are_written_and_probed() -> Result {
        let dir = tempfile::tempdir()?;
        let raster = Raster::zeroed(6, 3, SampleType::UInt8, PixelType::Grayscale, 1)?;
        let geo = Georeference::with_origin(1000.0, 2000.0, 2.0, 2.0, 6, 3);

        // tags and sidecar both written
        let tagged = dir.path().join("tagged.tif");
        let options = DestinationOptions {
            georeference: Some(geo.clone()),
            worldfile: true,
            ..Default::default()
        };
        TiffDestination::new(options).write_file(&tagged, &raster)?;
        assert!(tagged.with_extension("tfw").is_file());

        // a bare file with only a sidecar picks up its placement
        let bare = dir.path().join("bare.tif");
        TiffDestination::with_defaults().write_file(&bare, &raster)?;
        assert!(TiffOrigin::from_file(&bare)?.metadata().georeference.is_none());

        worldfile::write_for(&bare, &geo)?;
        let probed = TiffOrigin::from_file(&bare)?
            .metadata()
            .georeference
            .clone()
            .expect("sidecar placement");
        assert_abs_diff_eq!(probed.min_x, 1000.0);
        assert_abs_diff_eq!(probed.max_y, 2000.0);
        assert_eq!(probed.epsg, None);
        Ok(())
    }
}
