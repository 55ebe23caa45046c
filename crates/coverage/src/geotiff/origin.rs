//! Reading half of the GeoTIFF codec. The directory is parsed through the
//! `tiff` crate; chunk payloads are fetched by offset and decoded manually so
//! palette, sub byte and planar layouts survive untouched.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;

use tiff::decoder::{ChunkType, Decoder, Limits, ifd::Value};
use tiff::tags::Tag;

use super::fax;
use super::negotiate::{self, Photometric, RasterLayout, SampleFormatKind, TiffLayout};
use crate::{
    Error, Georeference, MemoryStream, Palette, Pixel, PixelType, PixelValue, Raster, RasterNum, Result, Rgb,
    SampleType, dispatch_sampletype_nowrap, worldfile,
};

/// Compression schemes the chunk codecs cover. Zstd is decode only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TiffCompression {
    None,
    Lzw,
    Fax4,
    Zstd,
}

impl TiffCompression {
    pub(crate) fn from_tag(value: u32) -> Result<Self> {
        match value {
            1 => Ok(Self::None),
            4 => Ok(Self::Fax4),
            5 => Ok(Self::Lzw),
            50000 => Ok(Self::Zstd),
            other => Err(Error::UnsupportedFormat(format!(
                "TIFF compression {} is not supported",
                other
            ))),
        }
    }

    pub(crate) fn tag_value(&self) -> u16 {
        match self {
            Self::None => 1,
            Self::Fax4 => 4,
            Self::Lzw => 5,
            Self::Zstd => 50000,
        }
    }
}

impl std::fmt::Display for TiffCompression {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Lzw => write!(f, "lzw"),
            Self::Fax4 => write!(f, "fax4"),
            Self::Zstd => write!(f, "zstd"),
        }
    }
}

/// How the pixel data is chopped into chunks: square tiles of the given edge
/// or strips of the given row count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkLayout {
    Tiled(u32),
    Striped(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ChunkLocation {
    offset: u64,
    size: u64,
}

impl ChunkLocation {
    fn is_sparse(&self) -> bool {
        self.size == 0
    }
}

/// Read region in file pixel coordinates. Offsets may be negative and the
/// region may extend past the raster; uncovered pixels keep the void fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub col_offset: i64,
    pub row_offset: i64,
    pub width: u32,
    pub height: u32,
}

impl Window {
    pub fn new(col_offset: i64, row_offset: i64, width: u32, height: u32) -> Self {
        Window {
            col_offset,
            row_offset,
            width,
            height,
        }
    }
}

/// Everything the directory parse extracts up front; chunk payloads stay on
/// the stream until a read asks for them.
#[derive(Debug, Clone)]
pub struct TiffMetadata {
    pub layout: RasterLayout,
    pub tiff_layout: TiffLayout,
    pub width: u32,
    pub height: u32,
    pub chunk_layout: ChunkLayout,
    pub compression: TiffCompression,
    pub planar_separate: bool,
    pub big_endian: bool,
    pub predictor_horizontal: bool,
    pub georeference: Option<Georeference>,
    pub nodata: Option<f64>,
    pub palette: Option<Arc<Palette>>,
    chunks: Vec<ChunkLocation>,
}

impl TiffMetadata {
    /// The NODATA declaration as a pixel matching the detected layout, `None`
    /// when the tag is absent or does not fit the sample type.
    pub fn nodata_pixel(&self) -> Option<Pixel> {
        let value = self.nodata?;
        let values = vec![PixelValue::from_f64(self.layout.sample_type, value); self.layout.bands];
        Pixel::new(self.layout.sample_type, self.layout.pixel_type, values).ok()
    }

    fn chunk_dimensions(&self) -> (usize, usize) {
        match self.chunk_layout {
            ChunkLayout::Tiled(size) => (size as usize, size as usize),
            ChunkLayout::Striped(rows) => (self.width as usize, rows as usize),
        }
    }
}

/// TIFF reader over a seekable stream, typically a [`File`] or a
/// [`MemoryStream`] over an in memory blob.
pub struct TiffOrigin<R> {
    stream: R,
    meta: TiffMetadata,
}

impl TiffOrigin<File> {
    /// Opens a TIFF file. When the file carries no GeoTIFF placement tags the
    /// worldfile sidecars next to it are probed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|_| Error::InvalidPath(path.to_path_buf()))?;
        let mut origin = TiffOrigin::from_stream(file)?;
        if origin.meta.georeference.is_none() {
            origin.meta.georeference = worldfile::read_for(path, origin.meta.width, origin.meta.height)?;
        }

        Ok(origin)
    }
}

impl TiffOrigin<MemoryStream> {
    pub fn from_memory(encoded: Vec<u8>) -> Result<Self> {
        TiffOrigin::from_stream(MemoryStream::from_vec(encoded))
    }
}

impl<R: Read + Seek> TiffOrigin<R> {
    pub fn from_stream(mut stream: R) -> Result<Self> {
        let meta = parse_metadata(&mut stream)?;
        Ok(TiffOrigin { stream, meta })
    }

    pub fn metadata(&self) -> &TiffMetadata {
        &self.meta
    }

    /// The full image in the layout the directory declares.
    pub fn read_raster(&mut self) -> Result<Raster> {
        let window = Window::new(0, 0, self.meta.width, self.meta.height);
        let void = zero_pixel(&self.meta.layout)?;
        self.read_window(&window, &void)
    }

    /// The full image converted to the requested layout. The file is decoded
    /// natively first, then a per pixel pass applies the negotiated
    /// conversion.
    pub fn read_raster_as(&mut self, target: &RasterLayout) -> Result<Raster> {
        let (_, conversion) = negotiate::negotiate(&self.meta.tiff_layout, Some(target))?;
        conversion.apply(self.read_raster()?)
    }

    /// Reads a window of the image. Pixels the file does not cover keep the
    /// `void` fill; sparse chunks stay at the fill as well.
    pub fn read_window(&mut self, window: &Window, void: &Pixel) -> Result<Raster> {
        let layout = self.meta.layout;
        if void.sample_type() != layout.sample_type
            || void.pixel_type() != layout.pixel_type
            || void.bands() != layout.bands
        {
            return Err(Error::InvalidArgument(format!(
                "Void pixel is {} {} x{}, the file holds {} {} x{}",
                void.sample_type(),
                void.pixel_type(),
                void.bands(),
                layout.sample_type,
                layout.pixel_type,
                layout.bands
            )));
        }

        let mut raster = Raster::filled(window.width, window.height, void)?;

        {
            let meta = &self.meta;
            let stream = &mut self.stream;
            dispatch_sampletype_nowrap!(
                layout.sample_type,
                T,
                merge_window_into::<T, R>(stream, meta, window, raster.typed_data_mut()?)?
            );
        }

        if layout.pixel_type == PixelType::Palette {
            if let Some(palette) = &self.meta.palette {
                raster = raster.with_palette(Arc::clone(palette))?;
            }
        }

        Ok(raster)
    }
}

fn zero_pixel(layout: &RasterLayout) -> Result<Pixel> {
    let values = vec![PixelValue::from_f64(layout.sample_type, 0.0); layout.bands];
    Pixel::new(layout.sample_type, layout.pixel_type, values)
}

fn parse_metadata<R: Read + Seek>(stream: &mut R) -> Result<TiffMetadata> {
    stream.seek(SeekFrom::Start(0))?;
    let mut magic = [0u8; 2];
    stream.read_exact(&mut magic)?;
    let big_endian = &magic == b"MM";
    stream.seek(SeekFrom::Start(0))?;

    let mut decoder = Decoder::new(&mut *stream)?.with_limits(Limits::unlimited());
    let (width, height) = decoder.dimensions()?;

    let tiff_layout = TiffLayout {
        bits_per_sample: uniform_u16(&mut decoder, Tag::BitsPerSample, 1)?,
        sample_format: SampleFormatKind::from_tag(uniform_u16(&mut decoder, Tag::SampleFormat, 1)?)?,
        photometric: Photometric::from_tag(decoder.get_tag_u32(Tag::PhotometricInterpretation)? as u16)?,
        samples_per_pixel: uniform_u16(&mut decoder, Tag::SamplesPerPixel, 1)?,
    };
    let layout = negotiate::detect(&tiff_layout)?;

    let compression = TiffCompression::from_tag(decoder.get_tag_u32(Tag::Compression).unwrap_or(1))?;
    if compression == TiffCompression::Fax4 && layout.sample_type != SampleType::OneBit {
        return Err(Error::UnsupportedFormat(
            "Group 4 compression is only valid for bilevel data".to_string(),
        ));
    }

    if decoder.get_tag_u32(Tag::FillOrder).is_ok_and(|order| order == 2) {
        return Err(Error::UnsupportedFormat("FillOrder 2 is not supported".to_string()));
    }

    let predictor_horizontal = match decoder.get_tag_u32(Tag::Predictor) {
        Ok(1) | Err(_) => false,
        Ok(2) => {
            if layout.sample_type.is_sub_byte() || layout.sample_type.is_float() {
                return Err(Error::UnsupportedFormat(format!(
                    "Horizontal predictor does not apply to {} samples",
                    layout.sample_type
                )));
            }
            true
        }
        Ok(other) => {
            return Err(Error::UnsupportedFormat(format!(
                "TIFF predictor {} is not supported",
                other
            )));
        }
    };

    let planar_separate = match decoder.get_tag_u32(Tag::PlanarConfiguration) {
        Ok(1) | Err(_) => false,
        Ok(2) => layout.bands > 1,
        Ok(other) => {
            return Err(Error::UnsupportedFormat(format!(
                "Planar configuration {} is not supported",
                other
            )));
        }
    };

    let chunk_layout = if decoder.get_chunk_type() == ChunkType::Tile {
        let tile_width = decoder.get_tag_u32(Tag::TileWidth)?;
        let tile_height = decoder.get_tag_u32(Tag::TileLength)?;
        if tile_width != tile_height {
            return Err(Error::UnsupportedFormat(format!(
                "Only square tiles are supported, got {}x{}",
                tile_width, tile_height
            )));
        }
        ChunkLayout::Tiled(tile_width)
    } else {
        let rows = decoder.get_tag_u32(Tag::RowsPerStrip).unwrap_or(height);
        ChunkLayout::Striped(rows.clamp(1, height))
    };

    let (offsets, byte_counts) = if matches!(chunk_layout, ChunkLayout::Tiled(_)) {
        (
            decoder.get_tag_u64_vec(Tag::TileOffsets)?,
            decoder.get_tag_u64_vec(Tag::TileByteCounts)?,
        )
    } else {
        (
            decoder.get_tag_u64_vec(Tag::StripOffsets)?,
            decoder.get_tag_u64_vec(Tag::StripByteCounts)?,
        )
    };

    if offsets.len() != byte_counts.len() {
        return Err(Error::TruncatedData(format!(
            "TIFF chunk table holds {} offsets and {} byte counts",
            offsets.len(),
            byte_counts.len()
        )));
    }

    let chunks: Vec<ChunkLocation> = offsets
        .into_iter()
        .zip(byte_counts)
        .map(|(offset, size)| ChunkLocation { offset, size })
        .collect();

    let (chunk_w, chunk_h) = match chunk_layout {
        ChunkLayout::Tiled(size) => (size, size),
        ChunkLayout::Striped(rows) => (width, rows),
    };
    let chunks_per_plane = width.div_ceil(chunk_w) as usize * height.div_ceil(chunk_h) as usize;
    let expected = chunks_per_plane * if planar_separate { layout.bands } else { 1 };
    if chunks.len() != expected {
        return Err(Error::TruncatedData(format!(
            "TIFF holds {} chunks, the layout needs {}",
            chunks.len(),
            expected
        )));
    }

    let palette = if tiff_layout.photometric == Photometric::Palette {
        Some(Arc::new(parse_color_map(
            &decoder.get_tag_u16_vec(Tag::ColorMap)?,
        )?))
    } else {
        None
    };

    let nodata = decoder
        .get_tag_ascii_string(Tag::GdalNodata)
        .ok()
        .and_then(|text| text.trim().parse::<f64>().ok());

    let georeference = read_georeference(&mut decoder, width, height);

    Ok(TiffMetadata {
        layout,
        tiff_layout,
        width,
        height,
        chunk_layout,
        compression,
        planar_separate,
        big_endian,
        predictor_horizontal,
        georeference,
        nodata,
        palette,
        chunks,
    })
}

/// Reads a tag that is written either as a single short or as one short per
/// band. Per band values must agree.
fn uniform_u16<R: Read + Seek>(decoder: &mut Decoder<&mut R>, tag: Tag, default: u16) -> Result<u16> {
    match decoder.get_tag(tag) {
        Ok(Value::List(values)) => {
            let values = values
                .into_iter()
                .map(Value::into_u16)
                .collect::<std::result::Result<Vec<u16>, tiff::TiffError>>()?;
            match values.as_slice() {
                [] => Ok(default),
                [first, rest @ ..] if rest.iter().all(|v| v == first) => Ok(*first),
                _ => Err(Error::UnsupportedFormat(format!("Per band {:?} values differ", tag))),
            }
        }
        Ok(value) => Ok(value.into_u16()?),
        Err(_) => Ok(default),
    }
}

/// TIFF color maps hold one 16 bit plane per channel, reds first. Values are
/// usually scaled up by 256; tables that never exceed 255 are taken as 8 bit.
fn parse_color_map(values: &[u16]) -> Result<Palette> {
    let plane = values.len() / 3;
    if plane == 0 || values.len() % 3 != 0 {
        return Err(Error::UnsupportedFormat(format!(
            "Malformed TIFF color map of {} values",
            values.len()
        )));
    }

    let wide = values.iter().any(|&v| v > 255);
    let narrow = |v: u16| if wide { (v >> 8) as u8 } else { v as u8 };

    let entries = (0..plane.min(256))
        .map(|i| Rgb::new(narrow(values[i]), narrow(values[plane + i]), narrow(values[2 * plane + i])))
        .collect();

    Palette::new(entries)
}

fn read_georeference<R: Read + Seek>(decoder: &mut Decoder<&mut R>, width: u32, height: u32) -> Option<Georeference> {
    let scale = decoder.get_tag_f64_vec(Tag::ModelPixelScaleTag).ok()?;
    let tie = decoder.get_tag_f64_vec(Tag::ModelTiepointTag).ok()?;
    if scale.len() < 2 || tie.len() < 6 {
        log::debug!("Ignoring malformed GeoTIFF placement tags");
        return None;
    }

    let x_res = scale[0];
    let y_res = scale[1].abs();
    if x_res <= 0.0 || y_res <= 0.0 {
        log::debug!("Ignoring GeoTIFF placement with resolutions {}x{}", scale[0], scale[1]);
        return None;
    }

    let min_x = tie[3] - tie[0] * x_res;
    let max_y = tie[4] + tie[1] * y_res;

    let mut geo = Georeference::with_origin(min_x, max_y, x_res, y_res, width, height);
    if let Some(epsg) = read_epsg(decoder) {
        geo = geo.with_epsg(epsg);
    }

    Some(geo)
}

fn read_epsg<R: Read + Seek>(decoder: &mut Decoder<&mut R>) -> Option<u32> {
    let key_dir = decoder.get_tag_u16_vec(Tag::GeoKeyDirectoryTag).ok()?;
    if key_dir.len() < 4 || key_dir[0] != 1 {
        return None;
    }

    let mut geographic = None;
    let mut projected = None;
    for key in key_dir[4..].chunks_exact(4) {
        // an inline short value has location 0 and count 1
        if key[1] != 0 || key[2] != 1 {
            continue;
        }
        match key[0] {
            2048 => geographic = Some(u32::from(key[3])),
            3072 => projected = Some(u32::from(key[3])),
            _ => {}
        }
    }

    projected.or(geographic)
}

fn merge_window_into<T: RasterNum, R: Read + Seek>(
    stream: &mut R,
    meta: &TiffMetadata,
    window: &Window,
    dest: &mut [T],
) -> Result<()> {
    let width = meta.width as usize;
    let height = meta.height as usize;
    let bands = meta.layout.bands;
    let (chunk_w, chunk_h) = meta.chunk_dimensions();
    let chunks_x = width.div_ceil(chunk_w);
    let chunks_y = height.div_ceil(chunk_h);
    let chunks_per_plane = chunks_x * chunks_y;
    let planes = if meta.planar_separate { bands } else { 1 };
    let chunk_bands = if meta.planar_separate { 1 } else { bands };
    let tiled = matches!(meta.chunk_layout, ChunkLayout::Tiled(_));

    for plane in 0..planes {
        for chunk_y in 0..chunks_y {
            let row0 = chunk_y * chunk_h;
            let present_rows = chunk_h.min(height - row0);
            let Some((row_start, row_end)) = overlap(
                row0 as i64,
                (row0 + present_rows) as i64,
                window.row_offset,
                window.row_offset + i64::from(window.height),
            ) else {
                continue;
            };

            for chunk_x in 0..chunks_x {
                let col0 = chunk_x * chunk_w;
                let present_cols = chunk_w.min(width - col0);
                let Some((col_start, col_end)) = overlap(
                    col0 as i64,
                    (col0 + present_cols) as i64,
                    window.col_offset,
                    window.col_offset + i64::from(window.width),
                ) else {
                    continue;
                };

                let location = meta.chunks[plane * chunks_per_plane + chunk_y * chunks_x + chunk_x];
                if location.is_sparse() {
                    continue;
                }

                let stored_rows = if tiled { chunk_h } else { present_rows };
                let samples = decode_chunk::<T, R>(stream, meta, &location, chunk_w, stored_rows, chunk_bands)?;

                for row in row_start..row_end {
                    let chunk_row = (row - row0 as i64) as usize;
                    let window_row = (row - window.row_offset) as usize;
                    let src = (chunk_row * chunk_w + (col_start - col0 as i64) as usize) * chunk_bands;
                    let dst = (window_row * window.width as usize + (col_start - window.col_offset) as usize) * bands;
                    let span = (col_end - col_start) as usize;

                    if meta.planar_separate {
                        for i in 0..span {
                            dest[dst + i * bands + plane] = samples[src + i];
                        }
                    } else {
                        dest[dst..dst + span * bands].copy_from_slice(&samples[src..src + span * bands]);
                    }
                }
            }
        }
    }

    Ok(())
}

fn overlap(a_start: i64, a_end: i64, b_start: i64, b_end: i64) -> Option<(i64, i64)> {
    let start = a_start.max(b_start);
    let end = a_end.min(b_end);
    (start < end).then_some((start, end))
}

/// Fetches one chunk and decodes it to unpacked native samples: decompress,
/// byte swap, unpredict, then normalize the photometric orientation.
fn decode_chunk<T: RasterNum, R: Read + Seek>(
    stream: &mut R,
    meta: &TiffMetadata,
    location: &ChunkLocation,
    chunk_cols: usize,
    stored_rows: usize,
    chunk_bands: usize,
) -> Result<Vec<T>> {
    let mut raw = vec![0u8; location.size as usize];
    stream.seek(SeekFrom::Start(location.offset))?;
    stream.read_exact(&mut raw)?;

    let sample_type = meta.layout.sample_type;
    let photometric = meta.tiff_layout.photometric;

    if meta.compression == TiffCompression::Fax4 {
        let mut bits = fax::decode(&raw, chunk_cols, stored_rows)?;
        if photometric == Photometric::MinIsBlack {
            for v in &mut bits {
                *v ^= 1;
            }
        }
        return cast_u8_samples(bits);
    }

    if let Some(max) = sample_type.sub_byte_max() {
        let row_bytes = (chunk_cols * sample_type.bits() as usize).div_ceil(8);
        let mut packed = vec![0u8; row_bytes * stored_rows];
        decompress_into(meta.compression, &raw, &mut packed)?;

        let mut samples = unpack_bits(&packed, sample_type.bits(), chunk_cols, stored_rows);
        match meta.layout.pixel_type {
            PixelType::Monochrome if photometric == Photometric::MinIsBlack => {
                for v in &mut samples {
                    *v ^= 1;
                }
            }
            PixelType::Grayscale if photometric == Photometric::MinIsWhite => {
                for v in &mut samples {
                    *v = max - *v;
                }
            }
            _ => {}
        }
        return cast_u8_samples(samples);
    }

    let mut samples = vec![T::zero(); chunk_cols * stored_rows * chunk_bands];
    {
        let bytes = bytemuck::cast_slice_mut::<T, u8>(&mut samples);
        decompress_into(meta.compression, &raw, bytes)?;

        let sample_width = std::mem::size_of::<T>();
        if meta.big_endian && sample_width > 1 {
            for sample in bytes.chunks_exact_mut(sample_width) {
                sample.reverse();
            }
        }
    }

    if meta.predictor_horizontal {
        unpredict_horizontal(&mut samples, chunk_cols * chunk_bands);
    }

    if meta.layout.pixel_type == PixelType::Grayscale && photometric == Photometric::MinIsWhite {
        for v in &mut samples {
            *v = T::max_value() - *v;
        }
    }

    Ok(samples)
}

fn cast_u8_samples<T: RasterNum>(samples: Vec<u8>) -> Result<Vec<T>> {
    if T::TYPE != SampleType::UInt8 {
        return Err(Error::Runtime("Bilevel data decodes into byte samples".to_string()));
    }

    Ok(bytemuck::cast_vec(samples))
}

fn decompress_into(compression: TiffCompression, data: &[u8], out: &mut [u8]) -> Result<()> {
    match compression {
        TiffCompression::None => {
            if data.len() != out.len() {
                return Err(Error::TruncatedData(format!(
                    "Chunk holds {} bytes, the layout needs {}",
                    data.len(),
                    out.len()
                )));
            }
            out.copy_from_slice(data);
            Ok(())
        }
        TiffCompression::Lzw => {
            let expected = out.len();
            let result = weezl::decode::Decoder::with_tiff_size_switch(weezl::BitOrder::Msb, 8)
                .into_stream(&mut std::io::BufWriter::new(&mut *out))
                .decode(data);
            if result.bytes_read != data.len() || result.bytes_written != expected {
                return Err(Error::TruncatedData(format!(
                    "LZW chunk expanded to {} of {} bytes",
                    result.bytes_written, expected
                )));
            }
            result.status?;
            Ok(())
        }
        TiffCompression::Zstd => {
            let mut decoder = ruzstd::decoding::StreamingDecoder::new(data)
                .map_err(|error| Error::Runtime(format!("Failed to create the Zstd decoder: {}", error)))?;
            decoder.read_exact(out)?;
            Ok(())
        }
        TiffCompression::Fax4 => Err(Error::Runtime(
            "Group 4 chunks decode through the fax codec".to_string(),
        )),
    }
}

/// MSB first bit unpacking; every row starts on a byte boundary.
fn unpack_bits(packed: &[u8], bits: u16, cols: usize, rows: usize) -> Vec<u8> {
    let bits = bits as usize;
    let row_bytes = (cols * bits).div_ceil(8);
    let mask = ((1u16 << bits) - 1) as u8;

    let mut samples = Vec::with_capacity(cols * rows);
    for row in 0..rows {
        let base = row * row_bytes;
        for col in 0..cols {
            let bit = col * bits;
            let shift = 8 - bits - bit % 8;
            samples.push((packed[base + bit / 8] >> shift) & mask);
        }
    }

    samples
}

fn unpredict_horizontal<T: RasterNum>(samples: &mut [T], row_len: usize) {
    fn int_rows<I: Copy + num::traits::WrappingAdd>(data: &mut [I], row_len: usize) {
        for row in data.chunks_mut(row_len) {
            for i in 1..row.len() {
                row[i] = row[i].wrapping_add(&row[i - 1]);
            }
        }
    }

    match T::TYPE {
        SampleType::OneBit | SampleType::TwoBit | SampleType::FourBit | SampleType::UInt8 => {
            int_rows(bytemuck::cast_slice_mut::<T, u8>(samples), row_len);
        }
        SampleType::Int8 => int_rows(bytemuck::cast_slice_mut::<T, i8>(samples), row_len),
        SampleType::UInt16 => int_rows(bytemuck::cast_slice_mut::<T, u16>(samples), row_len),
        SampleType::Int16 => int_rows(bytemuck::cast_slice_mut::<T, i16>(samples), row_len),
        SampleType::UInt32 => int_rows(bytemuck::cast_slice_mut::<T, u32>(samples), row_len),
        SampleType::Int32 => int_rows(bytemuck::cast_slice_mut::<T, i32>(samples), row_len),
        // the float predictor is rejected at parse time
        SampleType::Float32 | SampleType::Float64 => {}
    }
}
