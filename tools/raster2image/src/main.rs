use std::path::PathBuf;

use anyhow::bail;
use clap::{Parser, ValueEnum};
use coverage::geotiff::{
    DestinationOptions, RasterLayout, TiffChunkType, TiffCompression, TiffDestination, TiffOrigin,
};
use coverage::{
    BandStatistics, Georeference, Pixel, PixelType, PixelValue, Raster, Rgb, SampleBuffer, SampleType,
    band_statistics, gifcodec, worldfile,
};
use env_logger::{Env, TimestampPrecision};
use render::{
    BandStyle, BucketColorMap, Canvas, ContrastCurve, ContrastEnhancement, NumThreads, RasterSymbolizer,
    ShadedReliefOptions, Styling, shaded_relief,
};

pub type Result<T> = anyhow::Result<T>;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum RenderMode {
    /// One band through a contrast curve.
    Gray,
    /// Three bands composed into a color image.
    Rgb,
    /// Vegetation index from a red and a near infrared band.
    Ndvi,
    /// Hillshade of an elevation grid.
    Relief,
    /// Palette indexes resolved to their colors.
    Expand,
    /// Raw samples, no styling.
    Copy,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ContrastMode {
    None,
    Normalize,
    Gamma,
    Histogram,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Compression {
    None,
    Lzw,
    Fax4,
}

#[derive(Parser, Debug)]
#[clap(name = "raster2image", about = "Render a GeoTIFF coverage into a styled TIFF or GIF")]
pub struct Opt {
    #[arg(long = "input", short = 'i')]
    pub input: PathBuf,

    /// Output path; a .gif extension selects GIF, everything else TIFF.
    #[arg(long = "output", short = 'o')]
    pub output: PathBuf,

    #[arg(long = "mode", short = 'm', value_enum, default_value = "gray")]
    pub mode: RenderMode,

    /// Band rendered in gray mode.
    #[arg(long = "band", default_value = "0")]
    pub band: usize,

    /// Bands composed in rgb mode, as red,green,blue.
    #[arg(long = "bands", default_value = "0,1,2")]
    pub bands: String,

    /// Red band of the vegetation index.
    #[arg(long = "red", default_value = "0")]
    pub red: usize,

    /// Near infrared band of the vegetation index.
    #[arg(long = "nir", default_value = "1")]
    pub nir: usize,

    #[arg(long = "contrast", value_enum, default_value = "none")]
    pub contrast: ContrastMode,

    /// Exponent for the gamma contrast mode.
    #[arg(long = "gamma", default_value = "1.0")]
    pub gamma: f64,

    /// Output cell size as a multiple of the source cell size.
    #[arg(long = "scale", default_value = "1")]
    pub scale: u32,

    /// Byte filling unwritten output pixels.
    #[arg(long = "void", default_value = "0")]
    pub void: u8,

    /// Overrides the NODATA declaration of the source.
    #[arg(long = "nodata")]
    pub nodata: Option<f64>,

    #[arg(long = "compression", value_enum, default_value = "none")]
    pub compression: Compression,

    /// Tile the output TIFF with the given edge instead of strips.
    #[arg(long = "tile-size")]
    pub tile_size: Option<u32>,

    /// Also write a worldfile sidecar next to the output.
    #[arg(long = "worldfile")]
    pub worldfile: bool,

    /// Print the per band statistics of the source.
    #[arg(long = "stats")]
    pub stats: bool,

    /// Vertical exaggeration of the hillshade.
    #[arg(long = "relief-factor", default_value = "55.0")]
    pub relief_factor: f64,

    /// Sun direction in degrees, clockwise from north.
    #[arg(long = "azimuth", default_value = "315.0")]
    pub azimuth: f64,

    /// Sun elevation above the horizon in degrees.
    #[arg(long = "altitude", default_value = "45.0")]
    pub altitude: f64,

    /// Elevation units per ground unit.
    #[arg(long = "relief-scale", default_value = "1.0")]
    pub relief_scale: f64,

    /// Worker threads for the hillshade, all cpus when absent.
    #[arg(long = "threads")]
    pub threads: Option<usize>,
}

fn main() -> Result<()> {
    let opt = Opt::parse();

    env_logger::Builder::from_env(Env::default().default_filter_or("warn"))
        .format_timestamp(Some(TimestampPrecision::Millis))
        .init();

    if opt.scale == 0 {
        bail!("--scale must be positive");
    }

    let mut origin = TiffOrigin::from_file(&opt.input)?;
    let (width, height, placement, layout, tag_nodata) = {
        let metadata = origin.metadata();
        (
            metadata.width,
            metadata.height,
            metadata.georeference.clone(),
            metadata.layout,
            metadata.nodata,
        )
    };

    let placed = placement.is_some();
    let source_geo = placement.unwrap_or_else(|| {
        log::warn!("{} carries no placement, rendering in pixel coordinates", opt.input.display());
        Georeference::with_origin(0.0, f64::from(height), 1.0, 1.0, width, height)
    });
    let nodata_value = opt.nodata.or(tag_nodata);
    let nodata = match opt.nodata {
        Some(value) => Some(nodata_pixel(&layout, value)?),
        None => origin.metadata().nodata_pixel(),
    };

    let tile = origin.read_raster()?;
    log::debug!(
        "Read {}x{} {} {} from {}",
        width,
        height,
        tile.sample_type(),
        tile.pixel_type(),
        opt.input.display()
    );

    if opt.stats {
        print_band_statistics(&tile, nodata.as_ref())?;
    }

    let out_w = (width / opt.scale).max(1);
    let out_h = (height / opt.scale).max(1);
    let mut out_geo = Georeference::with_origin(
        source_geo.min_x,
        source_geo.max_y,
        source_geo.x_res * f64::from(opt.scale),
        source_geo.y_res * f64::from(opt.scale),
        out_w,
        out_h,
    );
    out_geo.epsg = source_geo.epsg;

    let rendered = if opt.mode == RenderMode::Relief {
        render_relief(&opt, &tile, &source_geo, out_geo.clone(), out_w, out_h, nodata_value)?
    } else {
        render(&opt, &tile, &source_geo, out_geo.clone(), out_w, out_h, nodata.as_ref())?
    };

    write_output(&opt, &rendered, placed.then_some(out_geo), nodata_value)?;
    Ok(())
}

fn render(
    opt: &Opt,
    tile: &Raster,
    source_geo: &Georeference,
    out_geo: Georeference,
    out_w: u32,
    out_h: u32,
    nodata: Option<&Pixel>,
) -> Result<Raster> {
    let styling = match opt.mode {
        RenderMode::Gray => {
            let stats = all_band_statistics(tile, nodata)?;
            RasterSymbolizer::MonoGray {
                band: opt.band,
                contrast: contrast_of(opt),
            }
            .compile(&stats)?
        }
        RenderMode::Rgb => {
            let [red, green, blue] = parse_band_triple(&opt.bands)?;
            let stats = all_band_statistics(tile, nodata)?;
            RasterSymbolizer::Triple {
                red,
                green,
                blue,
                contrast: contrast_of(opt),
            }
            .compile(&stats)?
        }
        RenderMode::Ndvi => RasterSymbolizer::Ndvi {
            red: opt.red,
            nir: opt.nir,
            map: vegetation_map()?,
        }
        .compile(&[])?,
        RenderMode::Expand => Styling::PaletteExpand,
        RenderMode::Copy => Styling::PassThrough,
        RenderMode::Relief => unreachable!("relief renders take their own path"),
    };

    let mut canvas = match &styling {
        Styling::PassThrough => {
            let values = vec![PixelValue::from_f64(tile.sample_type(), f64::from(opt.void)); tile.bands()];
            let void = Pixel::new(tile.sample_type(), tile.pixel_type(), values)?;
            Canvas::raw(out_geo, out_w, out_h, &void)?
        }
        Styling::Mono {
            style: BandStyle::Curve(_),
            ..
        } => Canvas::gray(out_geo, out_w, out_h, opt.void),
        _ => Canvas::rgb(out_geo, out_w, out_h, Rgb::new(opt.void, opt.void, opt.void)),
    }
    .with_mask();

    canvas.merge(tile, source_geo, &styling, nodata)?;
    let mut rendered = canvas.into_raster()?;

    if opt.mode == RenderMode::Copy {
        if let Some(palette) = tile.palette() {
            rendered = rendered.with_palette(palette.clone())?;
        }
    }

    Ok(rendered)
}

fn render_relief(
    opt: &Opt,
    tile: &Raster,
    source_geo: &Georeference,
    out_geo: Georeference,
    out_w: u32,
    out_h: u32,
    nodata: Option<f64>,
) -> Result<Raster> {
    let options = ShadedReliefOptions {
        relief_factor: opt.relief_factor,
        scale: opt.relief_scale,
        altitude: opt.altitude.to_radians(),
        azimuth: opt.azimuth.to_radians(),
        nodata: nodata.unwrap_or(-9999.0),
        num_threads: opt.threads.map_or(NumThreads::AllCpus, NumThreads::Count),
    };
    let shade = shaded_relief(tile, source_geo, &options)?;

    // shade values land in gray bytes, holes stay transparent
    let mut bytes = Vec::with_capacity(shade.len());
    let mut mask = Vec::with_capacity(shade.len());
    for value in shade {
        if value < 0.0 {
            bytes.push(0);
            mask.push(0);
        } else {
            bytes.push((value * 255.0).round() as u8);
            mask.push(1);
        }
    }
    let shaded = Raster::new(
        tile.width(),
        tile.height(),
        SampleType::UInt8,
        PixelType::Grayscale,
        1,
        SampleBuffer::U8(bytes),
    )?
    .with_mask(mask)?;

    let styling = Styling::Mono {
        band: 0,
        style: BandStyle::Curve(ContrastCurve::identity()),
    };
    let mut canvas = Canvas::gray(out_geo, out_w, out_h, opt.void).with_mask();
    canvas.merge(&shaded, source_geo, &styling, None)?;
    Ok(canvas.into_raster()?)
}

fn write_output(opt: &Opt, raster: &Raster, georeference: Option<Georeference>, nodata: Option<f64>) -> Result<()> {
    let gif = opt.output.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("gif"));
    if gif {
        if opt.tile_size.is_some() || opt.compression != Compression::None {
            log::warn!("TIFF layout options do not apply to GIF output");
        }
        std::fs::write(&opt.output, gifcodec::encode(raster)?)?;
        if opt.worldfile {
            match &georeference {
                Some(geo) => {
                    worldfile::write_for(&opt.output, geo)?;
                }
                None => bail!("A worldfile sidecar needs a georeferenced source"),
            }
        }
        return Ok(());
    }

    let options = DestinationOptions {
        chunk_type: opt.tile_size.map_or(TiffChunkType::Striped, TiffChunkType::Tiled),
        compression: match opt.compression {
            Compression::None => TiffCompression::None,
            Compression::Lzw => TiffCompression::Lzw,
            Compression::Fax4 => TiffCompression::Fax4,
        },
        georeference,
        nodata: (opt.mode == RenderMode::Copy).then_some(nodata).flatten(),
        worldfile: opt.worldfile,
    };
    TiffDestination::new(options).write_file(&opt.output, raster)?;
    Ok(())
}

fn contrast_of(opt: &Opt) -> ContrastEnhancement {
    match opt.contrast {
        ContrastMode::None => ContrastEnhancement::None,
        ContrastMode::Normalize => ContrastEnhancement::Normalize,
        ContrastMode::Gamma => ContrastEnhancement::Gamma(opt.gamma),
        ContrastMode::Histogram => ContrastEnhancement::Histogram,
    }
}

fn parse_band_triple(text: &str) -> Result<[usize; 3]> {
    let bands = text.split(',').collect::<Vec<_>>();
    if bands.len() != 3 {
        bail!("--bands expects red,green,blue, got {}", text);
    }

    Ok([
        bands[0].trim().parse()?,
        bands[1].trim().parse()?,
        bands[2].trim().parse()?,
    ])
}

fn nodata_pixel(layout: &RasterLayout, value: f64) -> Result<Pixel> {
    let values = vec![PixelValue::from_f64(layout.sample_type, value); layout.bands];
    Ok(Pixel::new(layout.sample_type, layout.pixel_type, values)?)
}

fn all_band_statistics(raster: &Raster, nodata: Option<&Pixel>) -> Result<Vec<BandStatistics>> {
    (0..raster.bands())
        .map(|band| Ok(band_statistics(raster, band, nodata)?))
        .collect()
}

fn print_band_statistics(raster: &Raster, nodata: Option<&Pixel>) -> Result<()> {
    for band in 0..raster.bands() {
        let stats = band_statistics(raster, band, nodata)?;
        println!("Band {}", band);
        println!("  {:<8} {:>16.4}", "minimum", stats.min);
        println!("  {:<8} {:>16.4}", "maximum", stats.max);
        println!("  {:<8} {:>16.4}", "mean", stats.mean);
        println!("  {:<8} {:>16.4}", "stddev", stats.stddev);
        println!("  {:<8} {:>16}", "samples", stats.count);
    }

    Ok(())
}

/// Classic NDVI ramp: water and bare soil below zero, deepening greens above.
fn vegetation_map() -> Result<BucketColorMap> {
    Ok(BucketColorMap::interpolate(
        &[
            (-1.0, Rgb::new(40, 54, 154)),
            (-0.1, Rgb::new(160, 110, 60)),
            (0.1, Rgb::new(255, 255, 191)),
            (0.4, Rgb::new(120, 198, 121)),
            (1.0, Rgb::new(0, 104, 55)),
        ],
        Rgb::black(),
        (-1.0, 1.0),
    )?)
}
